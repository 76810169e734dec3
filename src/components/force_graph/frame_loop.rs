/// Owner of the animation-frame callback and its pending request id.
///
/// The callback reschedules itself through this slot, so the slot and the
/// callback keep each other alive until [`FrameLoop::stop`] drops it.
pub struct FrameLoop<C> {
	callback: Option<C>,
	pending: Option<i32>,
}

impl<C> Default for FrameLoop<C> {
	fn default() -> Self {
		Self {
			callback: None,
			pending: None,
		}
	}
}

impl<C> FrameLoop<C> {
	pub fn start(&mut self, callback: C) {
		self.callback = Some(callback);
		self.pending = None;
	}

	pub fn callback(&self) -> Option<&C> {
		self.callback.as_ref()
	}

	pub fn is_running(&self) -> bool {
		self.callback.is_some()
	}

	/// Record the id of the frame request just made. Ignored once stopped.
	pub fn scheduled(&mut self, id: i32) {
		if self.is_running() {
			self.pending = Some(id);
		}
	}

	/// Drop the callback. Returns the outstanding request to cancel.
	pub fn stop(&mut self) -> Option<i32> {
		self.callback = None;
		self.pending.take()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::rc::Rc;

	#[test]
	fn stop_drops_the_callback_and_hands_back_the_request() {
		let callback = Rc::new(());
		let mut frames = FrameLoop::default();
		frames.start(Rc::clone(&callback));
		frames.scheduled(7);
		frames.scheduled(8);
		assert_eq!(Rc::strong_count(&callback), 2);

		assert_eq!(frames.stop(), Some(8));
		assert_eq!(Rc::strong_count(&callback), 1);
		assert!(!frames.is_running());
		assert_eq!(frames.stop(), None);
	}

	#[test]
	fn requests_after_stop_are_not_tracked() {
		let mut frames: FrameLoop<()> = FrameLoop::default();
		frames.start(());
		frames.stop();
		frames.scheduled(3);
		assert_eq!(frames.stop(), None);
	}
}
