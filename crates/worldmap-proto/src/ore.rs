use std::fmt;

/// A detected ore block. Closed set, per spec.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
pub enum OreType {
    Coal,
    Iron,
    Copper,
    Gold,
    Redstone,
    Lapis,
    Diamond,
    Emerald,
    Quartz,
    NetherGold,
    AncientDebris,
}

impl fmt::Display for OreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Looks up the [`OreType`] for a block name, if it names an ore.
///
/// The table is a small, closed set (per the spec's "polymorphism over
/// block names" note), so a `match` on normalized names reads better than a
/// runtime-built hash map.
pub fn ore_type(name: &str) -> Option<OreType> {
    match strip_namespace(name) {
        "coal_ore" | "deepslate_coal_ore" => Some(OreType::Coal),
        "iron_ore" | "deepslate_iron_ore" | "raw_iron_block" => Some(OreType::Iron),
        "copper_ore" | "deepslate_copper_ore" | "raw_copper_block" => Some(OreType::Copper),
        "gold_ore" | "deepslate_gold_ore" | "raw_gold_block" => Some(OreType::Gold),
        "redstone_ore" | "deepslate_redstone_ore" => Some(OreType::Redstone),
        "lapis_ore" | "deepslate_lapis_ore" => Some(OreType::Lapis),
        "diamond_ore" | "deepslate_diamond_ore" => Some(OreType::Diamond),
        "emerald_ore" | "deepslate_emerald_ore" => Some(OreType::Emerald),
        "nether_quartz_ore" => Some(OreType::Quartz),
        "nether_gold_ore" => Some(OreType::NetherGold),
        "ancient_debris" => Some(OreType::AncientDebris),
        _ => None,
    }
}

/// Strips a leading `minecraft:` namespace, if present.
fn strip_namespace(name: &str) -> &str {
    name.strip_prefix("minecraft:").unwrap_or(name)
}

/// Whether `name` can be a surface/ore scan candidate, per §4.2 step 2: not
/// "air", and not containing "void_air".
pub fn is_surface_candidate(name: &str) -> bool {
    let name = strip_namespace(name);
    name != "air" && !name.contains("void_air")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_deepslate_variants() {
        assert_eq!(ore_type("deepslate_diamond_ore"), Some(OreType::Diamond));
        assert_eq!(ore_type("minecraft:deepslate_diamond_ore"), Some(OreType::Diamond));
    }

    #[test]
    fn non_ore_returns_none() {
        assert_eq!(ore_type("stone"), None);
        assert_eq!(ore_type("grass_block"), None);
    }

    #[test]
    fn air_is_not_a_surface_candidate() {
        assert!(!is_surface_candidate("air"));
        assert!(!is_surface_candidate("minecraft:air"));
        assert!(!is_surface_candidate("the_void_air_variant"));
    }

    #[test]
    fn non_air_is_a_surface_candidate() {
        assert!(is_surface_candidate("stone"));
        assert!(is_surface_candidate("diamond_ore"));
    }
}
