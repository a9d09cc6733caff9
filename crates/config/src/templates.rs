//! Externalized prompt-template fragments and fixed word/phrase lists.
//!
//! spec.md §9 Design Notes asks for the teacher's "hundreds of multi-line
//! templates interleaved with conditionals" to become a template set, one
//! section per file/constant, composed through a typed builder rather
//! than ad hoc string concatenation. The composer in `persona-llm` pulls
//! these in by name; nothing here does any composition itself.

/// Fixed polite German-language sentence returned verbatim by the
/// Language Gate (C4) when the inbound message is confidently non-German.
pub const GERMAN_ONLY_REPLY: &str =
    "Entschuldige, ich verstehe am besten, wenn wir auf Deutsch schreiben – magst du es nochmal auf Deutsch versuchen?";

/// Heuristic whitelist of German function/content words used by the
/// Language Gate before ever calling the LLM (spec.md §4.4).
pub const GERMAN_WHITELIST_WORDS: &[&str] = &[
    "der", "die", "das", "und", "ist", "nicht", "ich", "du", "wir", "ihr", "sie", "ein", "eine",
    "was", "wie", "wo", "wann", "warum", "wieso", "weshalb", "hallo", "hi", "hey", "na", "servus",
    "moin", "guten", "morgen", "abend", "tag", "nacht", "schön", "schon", "auch", "noch", "mal",
    "doch", "ja", "nein", "bitte", "danke", "gerne", "kannst", "kann", "willst", "will", "magst",
    "mag", "hast", "habe", "bin", "bist", "sind", "war", "warst", "waren", "wäre", "fkk", "sauna",
    "treffen", "kuss", "liebe", "lieber", "liebes", "süß", "süßer", "süße", "schatz", "mein",
    "meine", "dein", "deine", "wirklich", "echt", "gerade", "heute", "morgen", "gestern", "immer",
    "nie", "vielleicht", "natürlich", "klar", "genau", "okay", "ok", "alles", "etwas", "nichts",
    "jemand", "niemand", "zusammen", "allein", "hier", "dort", "da", "dann", "denn", "weil",
    "obwohl", "aber", "oder", "also",
];

/// Short greetings that, if they are the entire message, are treated as
/// German without ever invoking the LLM (spec.md §4.4).
pub const GERMAN_SHORT_GREETINGS: &[&str] = &[
    "hi", "hey", "hallo", "na", "moin", "servus", "hey du", "hallo du", "na du", "huhu",
];

/// Explicit sexual keywords. Used (a) to demote a `sexual` context/flow
/// classification when none of these are present (spec.md §4.5 Context
/// Analyst), and (b) as the hard "never in a first-contact-from-us reply"
/// list checked by spec.md §8.
pub const EXPLICIT_SEXUAL_KEYWORDS: &[&str] = &[
    "sex", "ficken", "fick", "geil", "horny", "nackt", "nackig", "titten", "brüste", "schwanz",
    "muschi", "orgasmus", "wichsen", "blasen", "poppen", "sperma", "erregt", "erotisch", "lust auf dich",
];

/// Reciprocity/confirmation tokens required when the conversation is
/// sexual or the customer expressed something positive (spec.md §4.9, §8).
pub const RECIPROCITY_TOKENS: &[&str] = &[
    "auch", "finde ich auch", "macht mich auch", "auch richtig", "auch geil", "freut mich",
];

/// Meta-commentary forbidden phrases (spec.md §4.9, Glossary). Any of
/// these opening a sentence is a hard violation, never a style choice.
pub const META_COMMENTARY_PHRASES: &[&str] = &[
    "das klingt", "das hört sich an", "ich finde es toll, dass", "ich finde es schön, dass",
    "wie interessant, dass", "es freut mich zu hören, dass",
];

/// Phrases a meeting-deflection reply must never contain (spec.md §4.5
/// Meeting-Response "blocked phrases", §8 scenario 1).
pub const MEETING_BLOCKED_PHRASES: &[&str] = &[
    "wann können wir uns treffen", "treffen wir uns", "lass uns treffen", "café", "park",
    "abholen", "bei dir", "bei mir",
];

/// Phrases a meeting-deflection reply is allowed (encouraged) to use
/// instead (spec.md §4.5 Meeting-Response "allowed phrases").
pub const MEETING_ALLOWED_PHRASES: &[&str] = &[
    "schauen wir mal wann es bei mir klappt", "lass uns erstmal weiter schreiben",
    "mal sehen, wie sich das zeitlich ergibt",
];

/// Off-platform contact-exchange substrings (spec.md §8 scenario 2).
pub const OFF_PLATFORM_CONTACT_KEYWORDS: &[&str] = &["telegram", "whatsapp", "insta"];

/// Phrases that reference the profile harmlessly and should never be
/// read as sexual innuendo (spec.md §4.5 Meta-Validator rule 2).
pub const HARMLESS_COLLOCATION_WHITELIST: &[&str] = &[
    "evtl ziehen wir uns ja an",
    "passen wir zusammen",
    "vielleicht passen wir ja gut zusammen",
];

/// Phrases that trigger the Ambiguity Resolver (spec.md §4.5).
pub const AMBIGUOUS_PHRASE_TRIGGERS: &[&str] = &[
    "das meinte ich nicht so", "du weißt schon", "na du weißt schon was ich meine",
    "verstehst du was ich meine",
];

/// Well-known large German cities for which a whitelist of real
/// neighborhoods may be used by the Fake-Context Builder (spec.md §4.5).
pub const LARGE_CITY_NEIGHBORHOODS: &[(&str, &[&str])] = &[
    ("Berlin", &["Kreuzberg", "Prenzlauer Berg", "Friedrichshain", "Charlottenburg"]),
    ("Hamburg", &["Altona", "Sankt Pauli", "Eimsbüttel", "Winterhude"]),
    ("München", &["Schwabing", "Haidhausen", "Maxvorstadt", "Giesing"]),
    ("Köln", &["Ehrenfeld", "Nippes", "Südstadt", "Deutz"]),
    ("Frankfurt", &["Sachsenhausen", "Bornheim", "Nordend", "Bockenheim"]),
    ("Stuttgart", &["Bad Cannstatt", "Degerloch", "Feuerbach", "Vaihingen"]),
    ("Leipzig", &["Connewitz", "Plagwitz", "Schleußig", "Gohlis"]),
];

/// Fallback deflection used by the Fake-Context Builder for any city not
/// on the large-city whitelist (spec.md §4.5).
pub const NEIGHBORHOOD_DEFLECTION: &str = "sage ich, wenn wir uns besser kennen";

/// Short contextual extensions appended by post-processing when a
/// candidate is shorter than the minimum length (spec.md §4.10 step 7),
/// split by whether the conversation is sexual.
pub const LENGTH_EXTENSIONS_GENERAL: &[&str] = &[
    " Erzähl mir doch noch ein bisschen mehr von dir.",
    " Was machst du sonst gerne, wenn du Zeit hast?",
    " Ich würde dich gerne noch etwas besser kennenlernen.",
];

pub const LENGTH_EXTENSIONS_SEXUAL: &[&str] = &[
    " Das macht mich auch neugierig, wie es bei dir ist.",
    " Magst du mir verraten, was dir dabei besonders gefällt?",
];

/// Per-situation answer-pattern hints appended to the retrieval query
/// (spec.md §4.6 step 1).
pub const SITUATION_ANSWER_PATTERN_HINTS: &[(&str, &str)] = &[
    (
        persona_core::Situation::TREFFEN,
        "Treffen Termine Besuch vorbeikommen zu mir zu dir",
    ),
    (
        persona_core::Situation::KONTAKTDATEN,
        "Nummer WhatsApp Telegram Kontakt außerhalb Plattform",
    ),
    (persona_core::Situation::BILDER, "Bilder Fotos schicken senden"),
    (persona_core::Situation::GELD, "Geld Coins schicken überweisen"),
    (
        persona_core::Situation::SEXUELLE_THEMEN,
        "Sex geil heiß Lust erotisch",
    ),
    (persona_core::Situation::BOT_VORWURF, "Bot echt real Mensch Beweis"),
    (persona_core::Situation::STANDORT, "Woher Stadt wohnst Ort"),
    (persona_core::Situation::BERUF, "Beruf arbeite Job"),
    (
        persona_core::Situation::MODERATOR_OUTING,
        "Moderator Fake Agentur bezahlt",
    ),
];

/// Style-reminder block, hard-coded in full (spec.md §4.5 Rules-Applicator).
pub const STYLE_REMINDER_BLOCK: &str = "\
Schreibe im Stil der vorherigen Nachrichten des Moderators: natürlich, locker, \
in kurzen bis mittellangen Sätzen, ohne Ausrufezeichen, mit genau einer \
Frage am Ende der Antwort.";
