//! Idle rotation of the view.
//!
//! The angle lives across pauses: an interaction only flips the phase to
//! paused and (re)arms a resume deadline, it never resets the rotation.

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DriftPhase {
	Running,
	/// Paused until the frame clock reaches `resume_at` (ms).
	Paused { resume_at: f64 },
}

#[derive(Clone, Debug)]
pub struct Drift {
	angle: f64,
	step: f64,
	quiet_ms: f64,
	phase: DriftPhase,
}

impl Drift {
	/// `step` radians per frame; resume after `quiet_ms` without interaction.
	pub fn new(step: f64, quiet_ms: f64) -> Self {
		Self {
			angle: 0.0,
			step,
			quiet_ms,
			phase: DriftPhase::Running,
		}
	}

	pub fn angle(&self) -> f64 {
		self.angle
	}

	#[cfg(test)]
	pub fn phase(&self) -> DriftPhase {
		self.phase
	}

	#[cfg(test)]
	pub fn is_paused(&self) -> bool {
		matches!(self.phase, DriftPhase::Paused { .. })
	}

	/// Pause now; each further call pushes the resume deadline out again.
	pub fn interrupt(&mut self, now: f64) {
		self.phase = DriftPhase::Paused {
			resume_at: now + self.quiet_ms,
		};
	}

	/// Frame callback. Resumes once the deadline has passed, then advances by
	/// one step. Returns the current angle.
	pub fn advance(&mut self, now: f64) -> f64 {
		if let DriftPhase::Paused { resume_at } = self.phase {
			if now < resume_at {
				return self.angle;
			}
			self.phase = DriftPhase::Running;
		}
		self.angle = (self.angle + self.step) % std::f64::consts::TAU;
		self.angle
	}
}
