//! Verb table listing.

use serde::Serialize;
use strum::IntoEnumIterator;
use tabled::Tabled;

use crate::binding::{ArgKind, Verb};
use crate::cli::GlobalOpts;
use crate::output;

#[derive(Serialize)]
struct VerbEntry {
    verb: String,
    argument: ArgKind,
    description: &'static str,
}

#[derive(Tabled)]
struct VerbRow {
    #[tabled(rename = "Verb")]
    verb: String,
    #[tabled(rename = "Argument")]
    argument: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&VerbEntry> for VerbRow {
    fn from(v: &VerbEntry) -> Self {
        Self {
            verb: v.verb.clone(),
            argument: match v.argument {
                ArgKind::None => "-".into(),
                kind => kind.to_string(),
            },
            description: v.description.into(),
        }
    }
}

pub fn handle(global: &GlobalOpts) {
    let entries: Vec<VerbEntry> = Verb::iter()
        .map(|verb| VerbEntry {
            verb: verb.to_string(),
            argument: verb.arg_kind(),
            description: verb.description(),
        })
        .collect();

    let out = output::render_list(
        &global.output,
        &entries,
        |v| VerbRow::from(v),
        |v| v.verb.clone(),
    );
    output::print_output(&out, global.quiet);
}
