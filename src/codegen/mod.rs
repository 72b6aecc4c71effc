//! @ai:module:intent Kernel materialization: units, naming, generator, selection library
//! @ai:module:layer application
//! @ai:module:public_api StepArtifactBuilder, CodeGeneratorTrait, CommandGenerator, MockCodeGenerator, SelectionLibrary

pub mod artifacts;
pub mod generator;
pub mod kernel;
pub mod library;
pub mod naming;

pub use artifacts::{tile_probe_sizes, MaterializedStep, StepArtifactBuilder, StepLayout};
pub use generator::{
    CodeGeneratorTrait, CommandGenerator, GenerationOutcome, GenerationRequest, MockCodeGenerator,
};
pub use kernel::{HelperKernel, KernelSet, KernelUnit};
pub use library::SelectionLibrary;
pub use naming::StepNames;
