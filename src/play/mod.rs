/*!
The `play` module is the interactive playback engine: the scheduler that
walks the sorted event buffer against the tempo map, the key-light routine,
and the input matcher that gates playback on the user's key presses.
!*/

mod matcher;
mod notes;
mod player;

pub use player::Player;
