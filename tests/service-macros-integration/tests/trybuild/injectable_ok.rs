use di_abstractions::{Injectable, Slot};
use service_macros::{Injectable, Service};

#[derive(Service)]
struct Clock;

#[derive(Default, Injectable)]
struct Timer(Slot<Clock>, u32);

fn main() {
    let timer = Timer::default();
    assert_eq!(timer.injection_slots().len(), 1);
    assert_eq!(timer.1, 0);
}
