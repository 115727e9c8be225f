// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Compiled analysis binary.
//!
//! The binary is compiled once and instantiated fresh for every request, so no
//! state leaks between calls. Compilation also checks the binary's shape up
//! front: it must import nothing and export `memory` plus every function in
//! [`abi::REQUIRED_FUNCTIONS`].
//!
//! ## Wasmtime Configuration
//! - `consume_fuel(true)`: each request store gets a computational budget
//! - `epoch_interruption(false)`: prevents false "interrupt" traps
//! - `wasm_multi_memory(false)` + `wasm_memory64(false)`: one 32-bit memory,
//!   matching the wasm32 pointer convention of the accessors

use crate::bridge::abi;
use crate::bridge::detector::ensure_core_module;
use crate::bridge::error::{BridgeError, BridgeResult};
use crate::bridge::instance::AnalysisInstance;
use crate::observability::messages::bridge::BinaryCompiled;
use wasmtime::{Config, Engine, ExternType, Module};

/// A validated, compiled analysis binary.
///
/// Cheap to clone: `Engine` and `Module` are reference counted.
#[derive(Clone)]
pub struct AnalysisBinary {
    engine: Engine,
    module: Module,
    fuel: u64,
}

impl AnalysisBinary {
    /// Validates and compiles `bytes`, giving every request `fuel` units.
    pub fn from_bytes(bytes: &[u8], fuel: u64) -> BridgeResult<Self> {
        ensure_core_module(bytes)?;

        let mut config = Config::new();
        config.consume_fuel(true);
        config.epoch_interruption(false);
        config.wasm_multi_memory(false);
        config.wasm_memory64(false);

        let engine =
            Engine::new(&config).map_err(|e| BridgeError::ModuleError(e.to_string()))?;
        let module =
            Module::new(&engine, bytes).map_err(|e| BridgeError::ModuleError(e.to_string()))?;

        Self::check_imports(&module)?;
        Self::check_exports(&module)?;

        tracing::info!(
            "{}",
            BinaryCompiled {
                export_count: module.exports().len(),
                fuel_level: fuel,
            }
        );

        Ok(Self {
            engine,
            module,
            fuel,
        })
    }

    /// The host provides an empty environment, so any import would fail
    /// instantiation on every request.
    fn check_imports(module: &Module) -> BridgeResult<()> {
        let imports: Vec<String> = module
            .imports()
            .map(|import| format!("{}::{}", import.module(), import.name()))
            .collect();
        if imports.is_empty() {
            Ok(())
        } else {
            Err(BridgeError::ForbiddenImports(imports))
        }
    }

    fn check_exports(module: &Module) -> BridgeResult<()> {
        match module.get_export(abi::MEMORY) {
            Some(ExternType::Memory(_)) => {}
            Some(_) => {
                return Err(BridgeError::MissingExport {
                    name: abi::MEMORY,
                    reason: "export is not a memory".to_string(),
                })
            }
            None => {
                return Err(BridgeError::MissingExport {
                    name: abi::MEMORY,
                    reason: "not exported".to_string(),
                })
            }
        }

        for &name in abi::REQUIRED_FUNCTIONS {
            match module.get_export(name) {
                Some(ExternType::Func(_)) => {}
                Some(_) => {
                    return Err(BridgeError::MissingExport {
                        name,
                        reason: "export is not a function".to_string(),
                    })
                }
                None => {
                    return Err(BridgeError::MissingExport {
                        name,
                        reason: "not exported".to_string(),
                    })
                }
            }
        }
        Ok(())
    }

    /// Creates a fresh instance with its own store and fuel budget.
    pub fn instantiate(&self) -> BridgeResult<AnalysisInstance> {
        AnalysisInstance::new(&self.engine, &self.module, self.fuel)
    }

    pub fn fuel(&self) -> u64 {
        self.fuel
    }
}
