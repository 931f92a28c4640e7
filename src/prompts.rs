//! Prompt builders for the three AI tasks.
//!
//! Pure string factories: no I/O, no provider knowledge. The schemas the
//! prompts describe line up with the serde result types in `tasks`.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

/// Product categories the brewing log tracks.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    Coffee,
    Grinder,
    Brewer,
}

impl ProductKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductKind::Coffee => "coffee",
            ProductKind::Grinder => "grinder",
            ProductKind::Brewer => "brewer",
        }
    }

    fn photo_subject(&self) -> &'static str {
        match self {
            ProductKind::Coffee => "a bag of specialty coffee",
            ProductKind::Grinder => "a coffee grinder",
            ProductKind::Brewer => "a coffee brewing device",
        }
    }
}

/// A piece of equipment the user owns, as exposed to the voice prompt.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EquipmentRef {
    pub id: String,
    pub name: String,
}

/// The user's equipment inventory, embedded into the voice-parsing prompt
/// so the model can match spoken names against real records.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct EquipmentInventory {
    #[serde(default)]
    pub coffees: Vec<EquipmentRef>,
    #[serde(default)]
    pub grinders: Vec<EquipmentRef>,
    #[serde(default)]
    pub brewers: Vec<EquipmentRef>,
}

/// Free-text knobs for the product image prompt.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ImagePromptOptions {
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

const ANALYSIS_SHARED_KEYS: &str = r#"- "barcode": the digits of any visible barcode, as a string, or null
- "confidence": a number between 0 and 1 for how certain you are of the identification
- "sources": an array of short strings naming what the identification is based on, such as "label text" or "logo""#;

const ANALYSIS_RULES: &str = "Use null for any field that is not visible or cannot be determined. \
Respond with only the JSON object: no prose, no markdown fences, no explanations.";

/// Instruction block for identifying a product photo.
///
/// The key set depends on the product kind; every prompt shares the
/// barcode, confidence and sources keys.
pub fn image_analysis_prompt(kind: ProductKind) -> String {
    let mut prompt = String::new();

    let _ = writeln!(
        prompt,
        "You are looking at a photo of {}. Identify the product and respond with a single JSON object using exactly these keys:",
        kind.photo_subject()
    );
    prompt.push('\n');

    match kind {
        ProductKind::Coffee => {
            prompt.push_str(
                r#"- "roaster": the roasting company, or null
- "brand": the brand or product line on the bag, or null
- "model": the specific coffee or blend name, or null
- "origin": the country or region of origin, or null
- "roastLevel": one of "light", "medium-light", "medium", "medium-dark", "dark", or null
- "flavorNotes": an array of tasting notes printed on the bag, or an empty array
"#,
            );
        }
        ProductKind::Grinder => {
            prompt.push_str(
                r#"- "manufacturer": the company that makes the grinder, or null
- "brand": the brand or product line, or null
- "model": the model name or number, or null
- "burrType": "flat", "conical", or null if not determinable
"#,
            );
        }
        ProductKind::Brewer => {
            prompt.push_str(
                r#"- "manufacturer": the company that makes the brewer, or null
- "brand": the brand or product line, or null
- "model": the model name or number, or null
- "brewMethod": the brewing method this device is for, such as "pour-over", "espresso", "immersion", "moka", or null
"#,
            );
        }
    }

    prompt.push_str(ANALYSIS_SHARED_KEYS);
    prompt.push_str("\n\n");
    prompt.push_str(ANALYSIS_RULES);
    prompt
}

/// System prompt for turning a brewing voice note into structured data.
///
/// Embeds the user's equipment as id + name lists and spells out the
/// numeric conventions the app relies on: spoken durations collapse to
/// total seconds, and an unlabeled temperature above 50 is Fahrenheit.
pub fn voice_parsing_prompt(equipment: &EquipmentInventory) -> String {
    let mut prompt = String::from(
        "You convert the transcript of a spoken coffee-brewing note into structured data.\n\n",
    );

    prompt.push_str("The user owns the following equipment:\n");
    write_equipment_section(&mut prompt, "Coffees", &equipment.coffees);
    write_equipment_section(&mut prompt, "Grinders", &equipment.grinders);
    write_equipment_section(&mut prompt, "Brewers", &equipment.brewers);

    prompt.push_str(
        r#"
Extract every brew attribute the transcript mentions into a "parsed" object with these keys, leaving out keys that are not mentioned:
- "doseGrams": coffee dose in grams (number)
- "waterGrams": total water mass in grams (number)
- "temperature": brew water temperature as spoken (number)
- "temperatureUnit": "celsius" or "fahrenheit"
- "grindSetting": the grinder setting, as spoken (string)
- "bloomTimeSeconds": bloom time in seconds (number)
- "bloomWaterGrams": bloom water in grams (number)
- "totalTimeSeconds": total brew time in seconds (number)
- "tds": total dissolved solids as a percentage (number)
- "rating": the user's rating on a 1 to 10 scale (number)
- "technique": technique remarks (string)
- "tastingNotes": tasting remarks (string)

Conversion rules:
- Convert spoken durations to total seconds. "3 minutes 30 seconds" becomes 210.
- When a temperature is given without a unit, treat values above 50 as fahrenheit and values of 50 or below as celsius.

Match any coffee, grinder or brewer the transcript names against the equipment lists above. Match on name, tolerating partial and approximate mentions. Report each match as {"id", "name", "confidence"} with confidence between 0 and 1, or null when nothing matches.

Respond with a single JSON object and nothing else:
{"parsed": {...}, "matchedEquipment": {"coffee": ... or null, "grinder": ... or null, "brewer": ... or null}, "rawNotes": ... or null}

Put anything in the transcript that maps to no attribute into "rawNotes" as a string.
"#,
    );

    prompt
}

fn write_equipment_section(prompt: &mut String, label: &str, items: &[EquipmentRef]) {
    if items.is_empty() {
        let _ = writeln!(prompt, "{label}: none");
        return;
    }
    let _ = writeln!(prompt, "{label}:");
    for item in items {
        let _ = writeln!(prompt, "- {}: {}", item.id, item.name);
    }
}

/// Photography-style prompt for generating a product illustration.
pub fn image_generation_prompt(
    product_name: &str,
    kind: ProductKind,
    options: &ImagePromptOptions,
) -> String {
    let mut prompt = format!(
        "A clean professional product photograph of {}, {}.",
        product_name,
        kind.photo_subject()
    );

    if let Some(brand) = options.brand.as_deref().filter(|b| !b.is_empty()) {
        let _ = write!(prompt, " Brand: {brand}.");
    }
    if let Some(model) = options.model.as_deref().filter(|m| !m.is_empty()) {
        let _ = write!(prompt, " Model: {model}.");
    }
    if let Some(description) = options.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = write!(prompt, " {description}.");
    }

    prompt.push_str(" Neutral background, soft studio lighting, no text overlays, no people.");
    prompt
}
