use super::*;
use rustc_hash::FxHashSet;

#[test]
fn test_free_base_is_returned_unchanged() {
    assert_eq!(unique_id("Car_instance", |_| false), "Car_instance");
}

#[test]
fn test_collisions_get_numbered_suffixes() {
    let mut taken = FxHashSet::default();
    for _ in 0..3 {
        let id = unique_id("A_instance", |id| taken.contains(id));
        taken.insert(id);
    }

    assert!(taken.contains("A_instance"));
    assert!(taken.contains("A_instance_0"));
    assert!(taken.contains("A_instance_1"));
}

#[test]
fn test_freed_id_is_reused() {
    let taken: FxHashSet<&str> = ["A_instance_0"].into_iter().collect();
    assert_eq!(unique_id("A_instance", |id| taken.contains(id)), "A_instance");

    let taken: FxHashSet<&str> = ["A_instance", "A_instance_1"].into_iter().collect();
    assert_eq!(unique_id("A_instance", |id| taken.contains(id)), "A_instance_0");
}
