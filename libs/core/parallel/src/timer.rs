// [libs/core/parallel/src/timer.rs]
/*!
 * APARATO: TIMER DE FASES NOMBRADAS (V1.0)
 * RESPONSABILIDAD: ACUMULAR DURACIONES POR NOMBRE DE FASE EN UN SOLO HILO
 *
 * No es `Sync` a propósito — se usa únicamente desde el hilo que orquesta
 * una construcción o una consulta para reportar cuánto tiempo se fue en
 * cada etapa (lectura de términos, hasheo, escritura de slab, merge, ...).
 * Misma idea que el cronometraje ad hoc con `Instant` que ya hacía el
 * pipeline de ingestión, pero promovida a un tipo reutilizable.
 */

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use tracing::info;

/// Acumulador de duraciones por nombre de fase.
///
/// `start(name)` abre una fase; una fase abierta se cierra implícitamente
/// al llamar `start` con otro nombre o al llamar `stop()`. Llamar `start`
/// dos veces con el mismo nombre acumula la duración en vez de
/// reemplazarla, para fases que se repiten dentro de un mismo run (por
/// ejemplo "merge" en un merge por pares con varias rondas).
#[derive(Debug, Default)]
pub struct Timer {
    totals: BTreeMap<String, Duration>,
    running: Option<(String, Instant)>,
}

impl Timer {
    /// Crea un timer sin fases registradas y sin ninguna fase corriendo.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cierra la fase corriente (si hay una) y abre una nueva fase `name`.
    pub fn start(&mut self, name: impl Into<String>) {
        self.stop();
        self.running = Some((name.into(), Instant::now()));
    }

    /// Cierra la fase corriente, sumando su duración al total acumulado
    /// bajo su nombre. No hace nada si no hay ninguna fase corriendo.
    pub fn stop(&mut self) {
        if let Some((name, started_at)) = self.running.take() {
            *self.totals.entry(name).or_insert(Duration::ZERO) += started_at.elapsed();
        }
    }

    /// Descarta toda fase corriente y todos los totales acumulados.
    pub fn reset(&mut self) {
        self.totals.clear();
        self.running = None;
    }

    /// Duración total acumulada bajo `name`, incluyendo el tiempo corrido
    /// hasta ahora si `name` es la fase actualmente abierta. `None` si
    /// `name` nunca se registró.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Duration> {
        let stored = self.totals.get(name).copied();
        let running_extra = match &self.running {
            Some((running_name, started_at)) if running_name == name => {
                Some(started_at.elapsed())
            }
            _ => None,
        };
        match (stored, running_extra) {
            (Some(s), Some(r)) => Some(s + r),
            (Some(s), None) => Some(s),
            (None, Some(r)) => Some(r),
            (None, None) => None,
        }
    }

    /// Emite un evento `tracing::info!` por cada fase registrada, en orden
    /// alfabético, prefijado con `prefix`. No cierra la fase corriente.
    pub fn print(&self, prefix: &str) {
        for (name, duration) in &self.totals {
            info!(phase = %name, elapsed_ms = duration.as_millis(), "{prefix}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn stop_without_start_is_a_no_op() {
        let mut timer = Timer::new();
        timer.stop();
        assert!(timer.get("anything").is_none());
    }

    #[test]
    fn starting_a_new_phase_closes_the_previous_one() {
        let mut timer = Timer::new();
        timer.start("a");
        sleep(Duration::from_millis(5));
        timer.start("b");
        assert!(timer.get("a").unwrap() >= Duration::from_millis(5));
    }

    #[test]
    fn repeated_phases_accumulate() {
        let mut timer = Timer::new();
        timer.start("round");
        sleep(Duration::from_millis(5));
        timer.stop();
        timer.start("round");
        sleep(Duration::from_millis(5));
        timer.stop();
        assert!(timer.get("round").unwrap() >= Duration::from_millis(10));
    }

    #[test]
    fn reset_clears_everything() {
        let mut timer = Timer::new();
        timer.start("a");
        timer.stop();
        timer.reset();
        assert!(timer.get("a").is_none());
    }

    #[test]
    fn get_on_open_phase_includes_elapsed_time_so_far() {
        let mut timer = Timer::new();
        timer.start("open");
        sleep(Duration::from_millis(5));
        assert!(timer.get("open").unwrap() >= Duration::from_millis(5));
    }
}
