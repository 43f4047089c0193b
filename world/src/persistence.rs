//! Mapping between trap state and the host's attribute tree.
//!
//! Decoding never fails: missing keys fall back to defaults and malformed
//! values are reported as [`CodecError`] diagnostics next to a usable result.

use snare_core::{
    AttributeTree, AttributeValue, CreatureId, FoodCategory, ItemStack, TrapState, CAP_TOLERANCE,
};
use thiserror::Error;

/// Visual yaw in degrees (`float`).
pub const ROTATION_KEY: &str = "rotationYDeg";
/// Accumulated wear (`number`).
pub const DAMAGE_KEY: &str = "damage";
/// State ordinal or name (`int | string`).
pub const STATE_KEY: &str = "trapState";
/// Entity id of the captive (`long`).
pub const MOUNTED_ENTITY_KEY: &str = "mountedByEntityId";
/// Account uid of a captive player (`string`).
pub const MOUNTED_PLAYER_KEY: &str = "mountedByPlayerUid";
/// Destruction cause (`string`).
pub const DESTROYED_BY_KEY: &str = "destroyedByLangCode";
/// Item code of the bait (`string`).
pub const BAIT_CODE_KEY: &str = "baitCode";
/// Nutrition category of the bait (`string`).
pub const BAIT_CATEGORY_KEY: &str = "baitCategory";
/// Comma-separated food tags of the bait (`string`).
pub const BAIT_TAGS_KEY: &str = "baitFoodTags";

/// Reference to a captive as stored in the tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersistedCapture {
    /// Entity id of the captive.
    pub entity: CreatureId,
    /// Account uid when the captive is a player.
    pub player_uid: Option<String>,
}

/// Trap fields carried by the attribute tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PersistedTrap {
    /// Visual yaw in degrees.
    pub rotation_y_deg: f32,
    /// Accumulated wear.
    pub damage: f32,
    /// State of the trap.
    pub state: TrapState,
    /// Captive, if any.
    pub captured: Option<PersistedCapture>,
    /// Destruction cause.
    pub destroyed_descriptor: Option<String>,
    /// Bait sitting in the slot.
    pub bait: Option<ItemStack>,
}

/// Problems found while decoding a tree.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CodecError {
    /// A key held a value of the wrong kind and was ignored.
    #[error("attribute `{key}` should hold a {expected}")]
    WrongType {
        /// Offending key.
        key: &'static str,
        /// Value kind the codec expected.
        expected: &'static str,
    },
    /// The state value named no known state; `Closed` was used instead.
    #[error("unknown trap state `{0}`, defaulting to Closed")]
    UnknownState(String),
    /// The bait category named no known category and was dropped.
    #[error("unknown bait category `{0}`")]
    UnknownBaitCategory(String),
    /// A `Baited` state arrived without bait and was downgraded to `Open`.
    #[error("trap persisted as Baited without bait, defaulting to Open")]
    MissingBait,
}

/// Result of decoding a tree: always usable, possibly with diagnostics.
#[derive(Clone, Debug, PartialEq)]
pub struct Decoded {
    /// Decoded trap fields.
    pub trap: PersistedTrap,
    /// Everything that had to be defaulted or dropped.
    pub issues: Vec<CodecError>,
}

/// Writes `trap` into a fresh attribute tree.
#[must_use]
pub fn encode(trap: &PersistedTrap) -> AttributeTree {
    let mut tree = AttributeTree::new();
    tree.set(ROTATION_KEY, AttributeValue::Float(trap.rotation_y_deg));
    tree.set(DAMAGE_KEY, AttributeValue::Float(trap.damage));
    tree.set(STATE_KEY, AttributeValue::Int(trap.state.ordinal()));

    if let Some(capture) = &trap.captured {
        match i64::try_from(capture.entity.get()) {
            Ok(entity) => tree.set(MOUNTED_ENTITY_KEY, AttributeValue::Long(entity)),
            Err(_) => tracing::warn!(
                entity = capture.entity.get(),
                "captive id does not fit the attribute tree; not saved"
            ),
        }
        if let Some(uid) = &capture.player_uid {
            tree.set(MOUNTED_PLAYER_KEY, AttributeValue::String(uid.clone()));
        }
    }

    if let Some(descriptor) = &trap.destroyed_descriptor {
        tree.set(DESTROYED_BY_KEY, AttributeValue::String(descriptor.clone()));
    }

    if let Some(bait) = &trap.bait {
        tree.set(BAIT_CODE_KEY, AttributeValue::String(bait.code.clone()));
        if let Some(category) = bait.nutrition {
            tree.set(
                BAIT_CATEGORY_KEY,
                AttributeValue::String(category_name(category).to_owned()),
            );
        }
        if !bait.food_tags.is_empty() {
            tree.set(BAIT_TAGS_KEY, AttributeValue::String(bait.food_tags.join(",")));
        }
    }

    tree
}

/// Reads trap fields back from `tree`.
///
/// Wear at or past `max_durability` forces `Destroyed` whatever state was
/// stored, so stale saves heal themselves.
#[must_use]
pub fn decode(tree: &AttributeTree, max_durability: f32) -> Decoded {
    let mut issues = Vec::new();

    let rotation_y_deg = read_float(tree, ROTATION_KEY, &mut issues).unwrap_or(0.0);
    let damage = read_float(tree, DAMAGE_KEY, &mut issues)
        .filter(|value| value.is_finite())
        .map_or(0.0, |value| value.max(0.0));

    let bait = read_bait(tree, &mut issues);

    let state = if damage >= max_durability - CAP_TOLERANCE {
        TrapState::Destroyed
    } else {
        match read_state(tree, &mut issues) {
            TrapState::Baited if bait.is_none() => {
                issues.push(CodecError::MissingBait);
                TrapState::Open
            }
            state => state,
        }
    };

    let player_uid = read_string(tree, MOUNTED_PLAYER_KEY, &mut issues).filter(|uid| !uid.is_empty());
    let entity = match tree.get(MOUNTED_ENTITY_KEY) {
        None => 0,
        Some(_) => tree.get_long(MOUNTED_ENTITY_KEY).unwrap_or_else(|| {
            issues.push(CodecError::WrongType {
                key: MOUNTED_ENTITY_KEY,
                expected: "long",
            });
            0
        }),
    };
    let captured = if entity > 0 || player_uid.is_some() {
        Some(PersistedCapture {
            entity: CreatureId::new(u64::try_from(entity).unwrap_or(0)),
            player_uid,
        })
    } else {
        None
    };

    let destroyed_descriptor = read_string(tree, DESTROYED_BY_KEY, &mut issues);

    Decoded {
        trap: PersistedTrap {
            rotation_y_deg,
            damage: damage.min(max_durability.max(0.0)),
            bait: if state == TrapState::Baited { bait } else { None },
            state,
            captured,
            destroyed_descriptor,
        },
        issues,
    }
}

fn read_float(tree: &AttributeTree, key: &'static str, issues: &mut Vec<CodecError>) -> Option<f32> {
    if tree.get(key).is_none() {
        return None;
    }
    let value = tree.get_float(key);
    if value.is_none() {
        issues.push(CodecError::WrongType {
            key,
            expected: "number",
        });
    }
    value
}

fn read_string(
    tree: &AttributeTree,
    key: &'static str,
    issues: &mut Vec<CodecError>,
) -> Option<String> {
    if tree.get(key).is_none() {
        return None;
    }
    let value = tree.get_str(key).map(str::to_owned);
    if value.is_none() {
        issues.push(CodecError::WrongType {
            key,
            expected: "string",
        });
    }
    value
}

fn read_state(tree: &AttributeTree, issues: &mut Vec<CodecError>) -> TrapState {
    let parsed = match tree.get(STATE_KEY) {
        None => return TrapState::Closed,
        Some(AttributeValue::Int(ordinal)) => {
            TrapState::from_ordinal(*ordinal).ok_or_else(|| ordinal.to_string())
        }
        Some(AttributeValue::Long(ordinal)) => i32::try_from(*ordinal)
            .ok()
            .and_then(TrapState::from_ordinal)
            .ok_or_else(|| ordinal.to_string()),
        Some(AttributeValue::String(name)) => TrapState::parse(name).ok_or_else(|| name.clone()),
        Some(AttributeValue::Float(value)) => Err(value.to_string()),
    };

    parsed.unwrap_or_else(|raw| {
        issues.push(CodecError::UnknownState(raw));
        TrapState::Closed
    })
}

fn read_bait(tree: &AttributeTree, issues: &mut Vec<CodecError>) -> Option<ItemStack> {
    let code = read_string(tree, BAIT_CODE_KEY, issues)?;
    let nutrition = read_string(tree, BAIT_CATEGORY_KEY, issues).and_then(|name| {
        let category = parse_category(&name);
        if category.is_none() {
            issues.push(CodecError::UnknownBaitCategory(name));
        }
        category
    });
    let food_tags = read_string(tree, BAIT_TAGS_KEY, issues)
        .map(|joined| {
            joined
                .split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();

    Some(ItemStack {
        code,
        quantity: 1,
        nutrition,
        food_tags,
    })
}

fn category_name(category: FoodCategory) -> &'static str {
    match category {
        FoodCategory::Fruit => "fruit",
        FoodCategory::Vegetable => "vegetable",
        FoodCategory::Protein => "protein",
        FoodCategory::Grain => "grain",
        FoodCategory::Dairy => "dairy",
    }
}

fn parse_category(name: &str) -> Option<FoodCategory> {
    [
        FoodCategory::Fruit,
        FoodCategory::Vegetable,
        FoodCategory::Protein,
        FoodCategory::Grain,
        FoodCategory::Dairy,
    ]
    .into_iter()
    .find(|category| category_name(*category).eq_ignore_ascii_case(name))
}
