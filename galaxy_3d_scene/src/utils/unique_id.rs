/// Generates unique string IDs from a base ID.
///
/// Returns `base` if it is free, otherwise `base_0`, `base_1`, ... up to the
/// first free candidate. `is_taken` decides what "free" means, so callers can
/// check several registries at once (live instances plus the ones created by
/// an in-flight spawn).
///
/// # Example
///
/// ```ignore
/// let taken = ["Car_instance", "Car_instance_0"];
/// let id = unique_id("Car_instance", |id| taken.contains(&id));
/// assert_eq!(id, "Car_instance_1");
/// ```
pub fn unique_id(base: &str, is_taken: impl Fn(&str) -> bool) -> String {
    if !is_taken(base) {
        return base.to_string();
    }

    let mut index: u32 = 0;
    loop {
        let candidate = format!("{}_{}", base, index);
        if !is_taken(&candidate) {
            return candidate;
        }
        index += 1;
    }
}

#[cfg(test)]
#[path = "unique_id_tests.rs"]
mod tests;
