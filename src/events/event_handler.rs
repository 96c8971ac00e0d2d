/// A component that reacts to events from a channel it subscribed to.
pub trait EventHandler<T> {
    fn handle_event(&mut self, event: &T);
}
