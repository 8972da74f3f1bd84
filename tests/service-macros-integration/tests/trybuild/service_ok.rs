use di_abstractions::{Service, ServiceKey};
use service_macros::Service;

#[derive(Service)]
struct Clock;

#[derive(Service)]
#[service(depends_on(Clock))]
struct Scheduler<T: Send + Sync + 'static> {
    _marker: std::marker::PhantomData<T>,
}

fn main() {
    assert_eq!(
        <Scheduler<u8> as Service>::dependencies(),
        vec![ServiceKey::of::<Clock>()]
    );
}
