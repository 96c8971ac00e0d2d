// implemented by components that hold channel subscriptions pointing back at themselves;
// the Rc cycle is only broken by an explicit destroy
pub trait Destroyable {
    fn destroy(&mut self);
}
