pub mod model;
pub mod package;

pub use model::MODEL_ID;
pub use package::{
    DeckBuilder,
    PreparedNote,
    DECK_ID,
};
