use brain_engine::id::TaskCodeGenerator;

#[test]
fn codes_are_monotonic_and_unique() {
    let generator = TaskCodeGenerator::new();
    let mut prev = generator.next_code();
    for _ in 0..1000 {
        let next = generator.next_code();
        assert!(next > prev);
        prev = next;
    }
}
