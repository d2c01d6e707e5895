//! UI primitives (Button, Card, Input, Badge)

pub mod badge;
pub mod button;
pub mod card;
pub mod input;

pub use badge::*;
pub use button::*;
pub use card::*;
pub use input::*;
