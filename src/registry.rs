//! Compile-time method registry.
//!
//! Protocol descriptors name their post-demodulation converter by a
//! symbolic string (e.g. `"ConvLaCrosse"`). Rather than look that string up
//! via reflection, it is matched once here against a fixed enum whose
//! variants are resolved by an ordinary `match` — a typo in a catalog entry
//! is a `None` at load-adjacent time, not a runtime method-missing surprise
//! three calls deep.

use crate::convert;
use crate::error::GatewayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConverterFn {
    PostDemoEm,
    PostDemoFs20,
    PostDemoFht80,
    PostDemoFht80Tf,
    PostDemoRevolt,
    McBitGeneric,
    McBitFunkbus,
    McBitSomfyRts,
    McBitGrothe,
    McBitAs,
    McBitSainlogic,
    ConvBresserLightning,
    ConvBresser5in1,
    ConvBresser6in1,
    ConvBresser7in1,
    ConvPca301,
    ConvLaCrosse,
    ConvKoppFreeControl,
    /// Pass the payload through unchanged — most MN protocols' `method`.
    Identity,
}

/// Resolve a protocol descriptor's `method` string against the registry.
pub fn resolve_method(name: &str) -> Option<ConverterFn> {
    Some(match name {
        "postDemo_EM" => ConverterFn::PostDemoEm,
        "postDemo_FS20" => ConverterFn::PostDemoFs20,
        "postDemo_FHT80" => ConverterFn::PostDemoFht80,
        "postDemo_FHT80TF" => ConverterFn::PostDemoFht80Tf,
        "postDemo_Revolt" => ConverterFn::PostDemoRevolt,
        "mcBit2Generic" => ConverterFn::McBitGeneric,
        "mcBit2Funkbus" => ConverterFn::McBitFunkbus,
        "mcBit2SomfyRTS" => ConverterFn::McBitSomfyRts,
        "mcBit2Grothe" => ConverterFn::McBitGrothe,
        "mcBit2AS" => ConverterFn::McBitAs,
        "mcBit2Sainlogic" => ConverterFn::McBitSainlogic,
        "ConvBresser_lightning" => ConverterFn::ConvBresserLightning,
        "ConvBresser_5in1" => ConverterFn::ConvBresser5in1,
        "ConvBresser_6in1" => ConverterFn::ConvBresser6in1,
        "ConvBresser_7in1" => ConverterFn::ConvBresser7in1,
        "ConvPCA301" => ConverterFn::ConvPca301,
        "ConvLaCrosse" => ConverterFn::ConvLaCrosse,
        "ConvKoppFreeControl" => ConverterFn::ConvKoppFreeControl,
        "Identity" => ConverterFn::Identity,
        _ => return None,
    })
}

/// Run the resolved converter against its input. `postDemo_*` and
/// `mcBit2*` variants take a bit string (`'0'`/`'1'`, `mcBit2*` take hex
/// already reconstructed from manchester pairs); the `Conv*` variants take
/// a raw hex payload.
pub fn apply(kind: ConverterFn, input: &str) -> Result<String, GatewayError> {
    match kind {
        ConverterFn::PostDemoEm => convert::em_fs20_fht::post_demo_em(input),
        ConverterFn::PostDemoFs20 => convert::em_fs20_fht::post_demo_fs20(input),
        ConverterFn::PostDemoFht80 => convert::em_fs20_fht::post_demo_fht80(input),
        ConverterFn::PostDemoFht80Tf => convert::em_fs20_fht::post_demo_fht80tf(input),
        ConverterFn::PostDemoRevolt => convert::revolt::post_demo_revolt(input),
        ConverterFn::McBitGeneric => convert::manchester::mc_bit2_generic(input),
        ConverterFn::McBitFunkbus => convert::manchester::mc_bit2_funkbus(input),
        ConverterFn::McBitSomfyRts => convert::manchester::mc_bit2_somfy_rts(input),
        ConverterFn::McBitGrothe => convert::manchester::mc_bit2_grothe(input),
        ConverterFn::McBitAs => convert::manchester::mc_bit2_as(input),
        ConverterFn::McBitSainlogic => convert::manchester::mc_bit2_sainlogic(input),
        ConverterFn::ConvBresserLightning => convert::bresser::conv_bresser_lightning(input),
        ConverterFn::ConvBresser5in1 => convert::bresser::conv_bresser_5in1(input),
        ConverterFn::ConvBresser6in1 => convert::bresser::conv_bresser_6in1(input),
        ConverterFn::ConvBresser7in1 => convert::bresser::conv_bresser_7in1(input),
        ConverterFn::ConvPca301 => convert::reformat::conv_pca301(input),
        ConverterFn::ConvLaCrosse => convert::reformat::conv_lacrosse(input),
        ConverterFn::ConvKoppFreeControl => convert::reformat::conv_kopp_free_control(input),
        ConverterFn::Identity => Ok(input.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_names() {
        assert_eq!(resolve_method("ConvLaCrosse"), Some(ConverterFn::ConvLaCrosse));
        assert_eq!(resolve_method("mcBit2Generic"), Some(ConverterFn::McBitGeneric));
    }

    #[test]
    fn rejects_unknown_names() {
        assert_eq!(resolve_method("NotARealMethod"), None);
    }
}
