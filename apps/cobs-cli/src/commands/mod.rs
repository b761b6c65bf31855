// [apps/cobs-cli/src/commands/mod.rs]

/// Comandos de construcción de índices (clásico, compacto, combinación).
pub mod build;
/// Consultas sintéticas de diagnóstico (generación de datos de prueba).
pub mod generate;
/// Comandos de sólo-lectura sobre colecciones y parámetros (sin tocar disco de salida).
pub mod inspect;
/// El comando `query`.
pub mod query;
