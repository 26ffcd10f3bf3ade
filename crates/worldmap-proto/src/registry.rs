use crate::color::Rgb24;

/// Color used for any block name not present in [`base_color`]'s table.
pub const DEFAULT_COLOR: Rgb24 = Rgb24::new(127, 127, 127);

/// Static block-name -> base color table.
///
/// A real deployment's table is much larger (one entry per block state the
/// target Minecraft version defines); this carries the set exercised by the
/// spec's scenarios plus common terrain blocks. Unknown names fall back to
/// [`DEFAULT_COLOR`], per §4.2's color mapping contract.
pub fn base_color(name: &str) -> Rgb24 {
    let name = name.strip_prefix("minecraft:").unwrap_or(name);

    match name {
        "stone" | "deepslate" => Rgb24::new(125, 125, 125),
        "grass_block" => Rgb24::new(92, 156, 70),
        "dirt" | "coarse_dirt" => Rgb24::new(134, 96, 67),
        "sand" => Rgb24::new(219, 207, 163),
        "red_sand" => Rgb24::new(189, 98, 42),
        "sandstone" => Rgb24::new(219, 207, 163),
        "gravel" => Rgb24::new(136, 126, 123),
        "water" => Rgb24::new(63, 118, 228),
        "lava" => Rgb24::new(217, 96, 16),
        "snow" | "snow_block" => Rgb24::new(248, 248, 248),
        "ice" | "packed_ice" => Rgb24::new(160, 188, 249),
        "clay" => Rgb24::new(159, 164, 177),
        "obsidian" => Rgb24::new(20, 18, 29),
        "netherrack" => Rgb24::new(112, 53, 53),
        "soul_sand" => Rgb24::new(84, 64, 51),
        "end_stone" => Rgb24::new(219, 219, 172),
        "basalt" => Rgb24::new(76, 76, 85),
        "blackstone" => Rgb24::new(42, 36, 40),
        "oak_log" | "oak_planks" => Rgb24::new(162, 130, 78),
        "oak_leaves" | "birch_leaves" | "spruce_leaves" => Rgb24::new(60, 110, 50),
        "coal_ore" | "deepslate_coal_ore" => Rgb24::new(54, 54, 54),
        "iron_ore" | "deepslate_iron_ore" => Rgb24::new(216, 175, 147),
        "copper_ore" | "deepslate_copper_ore" => Rgb24::new(195, 126, 88),
        "gold_ore" | "deepslate_gold_ore" => Rgb24::new(252, 238, 75),
        "redstone_ore" | "deepslate_redstone_ore" => Rgb24::new(171, 22, 14),
        "lapis_ore" | "deepslate_lapis_ore" => Rgb24::new(36, 86, 156),
        "diamond_ore" | "deepslate_diamond_ore" => Rgb24::new(93, 236, 245),
        "emerald_ore" | "deepslate_emerald_ore" => Rgb24::new(46, 189, 110),
        "nether_quartz_ore" => Rgb24::new(226, 214, 192),
        "nether_gold_ore" => Rgb24::new(186, 93, 39),
        "ancient_debris" => Rgb24::new(99, 73, 65),
        _ => DEFAULT_COLOR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_block_has_dedicated_color() {
        assert_ne!(base_color("stone"), DEFAULT_COLOR);
        assert_ne!(base_color("minecraft:stone"), DEFAULT_COLOR);
    }

    #[test]
    fn unknown_block_falls_back() {
        assert_eq!(base_color("some_future_block_id"), DEFAULT_COLOR);
    }
}
