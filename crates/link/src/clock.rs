/// The simulator's clock primitive.
///
/// `usleep` blocks until the simulation has advanced by `delta_usec`
/// microseconds of simulated time. It returns `false` once the simulation has
/// ended; callers treat that as the end of the run, not as an error.
pub trait SimClock {
    fn usleep(&mut self, delta_usec: u64) -> bool;
}

impl<C: SimClock + ?Sized> SimClock for Box<C> {
    fn usleep(&mut self, delta_usec: u64) -> bool {
        (**self).usleep(delta_usec)
    }
}
