#[cfg(test)]
mod _tests_symmetry_list {
    use super::super::point_groups::PointGroup;
    use super::super::symmetry_list::SymList;
    use crate::error::BackprojectorError;

    #[test]
    fn test_c1_is_empty() {
        let list = SymList::from_symbol("c1").unwrap();
        assert!(list.is_empty());
        assert_eq!(list.true_symmetry_count(), 1);
        assert!(list.rotation(0).is_none());
    }

    #[test]
    fn test_excludes_identity() {
        for symbol in ["c3", "d2", "t", "o", "i3"] {
            let list = SymList::from_symbol(symbol).unwrap();
            let order = PointGroup::parse(symbol).unwrap().order();
            assert_eq!(list.len(), order - 1);
            assert!(list.iter().all(|op| !op.is_identity()));
            assert_eq!(list.with_identity().len(), order);
            assert!(list.with_identity()[0].is_identity());
        }
    }

    #[test]
    fn test_deterministic_order() {
        let a = SymList::from_symbol("i").unwrap();
        let b = SymList::from_symbol("I2").unwrap();
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert!(x.approx_eq(y));
        }
    }

    #[test]
    fn test_d2_rotations_are_integer() {
        let list = SymList::from_symbol("d2").unwrap();
        for op in list.iter() {
            for value in op.rotation.iter() {
                assert!((value - value.round()).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_unknown_symbol() {
        assert!(matches!(
            SymList::from_symbol("q9"),
            Err(BackprojectorError::UnknownSymmetry(_))
        ));
    }
}
