use genanki_rs::{
    Field,
    Model,
    Template,
};

use crate::core::LanguagePair;

pub const MODEL_ID: i64 = 1613951331974;

const CARD_CSS: &str = "\
.card {
    font-family: arial;
    font-size: 20px;
    text-align: center;
    color: black;
    background-color: white;
}
";

/// Note fields in model order: word, sentence and audio of the source side,
/// then word, sentence and note of the target side.
pub fn field_names(languages: &LanguagePair) -> [String; 6] {
    let src = &languages.source;
    let trg = &languages.target;
    [
        format!("{src}_word"),
        format!("{src}_sentence"),
        format!("{src}_audio"),
        format!("{trg}_word"),
        format!("{trg}_sentence"),
        format!("{trg}_note"),
    ]
}

fn placeholder(name: &str) -> String {
    format!("{{{{{name}}}}}")
}

/// Renders `body` only when `name` is not empty.
fn section(name: &str, body: &str) -> String {
    format!("{{{{#{name}}}}}{body}{{{{/{name}}}}}")
}

pub fn front_template(names: &[String; 6]) -> String {
    let [word, sentence, audio, ..] = names;
    format!(
        "{}{}{}",
        placeholder(word),
        section(sentence, &format!("<br><br><i>{}</i>", placeholder(sentence))),
        placeholder(audio)
    )
}

pub fn back_template(names: &[String; 6]) -> String {
    let [.., word, sentence, note] = names;
    format!(
        "{{{{FrontSide}}}}<hr id=answer>{}{}{}",
        placeholder(word),
        section(sentence, &format!("<br><br><i>{}</i>", placeholder(sentence))),
        section(note, &format!("<br><br><small>{}</small>", placeholder(note)))
    )
}

/// Single-card model: source side on the front, target side on the back.
pub fn vocabulary_model(languages: &LanguagePair, model_id: i64) -> Model {
    let names = field_names(languages);
    let name = format!("favs2anki vocabulary ({}-{})", languages.source, languages.target);
    let template = Template::new("Front")
        .qfmt(&front_template(&names))
        .afmt(&back_template(&names));

    Model::new_with_options(
        model_id,
        &name,
        names.iter().map(|field| Field::new(field)).collect(),
        vec![template],
        Some(CARD_CSS),
        None,
        None,
        None,
        None,
    )
}
