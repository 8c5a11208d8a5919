use super::*;

#[test]
fn allocates_from_start_port() {
    let alloc = PortAllocator::new(11000);
    assert_eq!(alloc.allocate(), 11000);
    assert_eq!(alloc.allocate(), 11001);
}

#[test]
fn release_frees_for_reuse() {
    let alloc = PortAllocator::new(11000);
    let p = alloc.allocate();
    alloc.release(p);
    assert_eq!(alloc.allocate(), p);
}

#[test]
fn allocations_are_unique_while_held() {
    let alloc = PortAllocator::new(11000);
    let a = alloc.allocate();
    let b = alloc.allocate();
    assert_ne!(a, b);
    assert_eq!(alloc.in_use_count(), 2);
}

#[test]
fn fills_gaps_left_by_release() {
    let alloc = PortAllocator::new(11000);
    let a = alloc.allocate();
    let b = alloc.allocate();
    let _c = alloc.allocate();
    alloc.release(b);
    assert_eq!(alloc.allocate(), b);
    assert_ne!(alloc.allocate(), a);
}
