//! Per-cycle evaluation context assembly

mod assembler;

pub use assembler::{
    passes_liquidity_floor, symbols_to_evaluate, AssemblerSettings, ContextAssembler,
    EvaluationContext,
};
