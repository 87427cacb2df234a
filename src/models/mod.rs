pub mod condition;
pub mod conversation;
pub mod enums;
pub mod symptom;

pub use condition::*;
pub use conversation::*;
pub use enums::*;
pub use symptom::*;
