use std::sync::OnceLock;

use crate::vdp2::layer::LayerId;

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "on" | "ON"))
        .unwrap_or(default)
}

fn env_layer_list(key: &str) -> Vec<LayerId> {
    std::env::var(key)
        .map(|v| parse_layer_list(&v))
        .unwrap_or_default()
}

pub(crate) fn parse_layer_list(list: &str) -> Vec<LayerId> {
    list.split(',')
        .filter_map(|name| LayerId::from_name(name.trim()))
        .collect()
}

// Log every register bank write at trace level
pub fn trace_registers() -> bool {
    static ON: OnceLock<bool> = OnceLock::new();
    *ON.get_or_init(|| env_flag("VDP2_TRACE_REGS", false))
}

// Log each layer's derived configuration once per frame
pub fn dump_layers() -> bool {
    static ON: OnceLock<bool> = OnceLock::new();
    *ON.get_or_init(|| env_flag("VDP2_DUMP_LAYERS", false))
}

// Composite even while TVMD.DISP is clear
pub fn force_display() -> bool {
    static ON: OnceLock<bool> = OnceLock::new();
    *ON.get_or_init(|| env_flag("VDP2_FORCE_DISPLAY", false))
}

// Layers removed from compositing, e.g. VDP2_HIDE_LAYERS=NBG1,RBG0
pub fn hidden_layers() -> &'static [LayerId] {
    static LIST: OnceLock<Vec<LayerId>> = OnceLock::new();
    LIST.get_or_init(|| env_layer_list("VDP2_HIDE_LAYERS"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_layer_list() {
        assert_eq!(
            parse_layer_list("NBG1, rbg0,bogus,SPRITE"),
            vec![LayerId::Nbg1, LayerId::Rbg0, LayerId::Sprite]
        );
        assert!(parse_layer_list("").is_empty());
    }
}
