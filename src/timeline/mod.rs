/// Item lifecycle states and the visible-set query.
pub mod sequencer;
