// [libs/core/parallel/src/parallel_for.rs]
/*!
 * APARATO: PARALLEL_FOR (V1.0)
 * RESPONSABILIDAD: REPARTO DE UN RANGO ENTERO ENTRE HILOS CON CAPTURA DE PÁNICO
 *
 * Para `num_threads <= 1`, corre serialmente en el hilo actual. En otro
 * caso, despacha `num_threads` trabajadores Rayon que extraen índices de
 * un contador atómico compartido hasta agotar el rango; el primer pánico
 * capturado se vuelve a propagar en el hilo coordinador una vez que todos
 * los trabajadores terminan (spec §4.8).
 */

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Ejecuta `body(i)` para cada `i` en `[begin, end)`.
///
/// Con `num_threads <= 1` la ejecución es estrictamente secuencial y en
/// orden ascendente — esto es lo que usan las pruebas deterministas y los
/// llamadores para los que el orden de escritura importa. Con más de un
/// hilo el orden de visita ya no está garantizado entre índices, pero cada
/// índice se visita exactamente una vez.
///
/// # Panics
///
/// Si `body` entra en pánico en cualquier hilo trabajador, ese pánico se
/// vuelve a lanzar en el hilo que llamó a `parallel_for` una vez que el
/// resto de los trabajadores ha terminado su porción del rango.
pub fn parallel_for<F>(begin: u64, end: u64, num_threads: usize, body: F)
where
    F: Fn(u64) + Sync,
{
    if begin >= end {
        return;
    }

    if num_threads <= 1 {
        for i in begin..end {
            body(i);
        }
        return;
    }

    let counter = AtomicU64::new(begin);
    let captured_panic: Mutex<Option<Box<dyn std::any::Any + Send>>> = Mutex::new(None);

    let pool_threads = num_threads.min((end - begin) as usize).max(1);

    rayon::scope(|scope| {
        for _ in 0..pool_threads {
            scope.spawn(|_| {
                loop {
                    let i = counter.fetch_add(1, Ordering::Relaxed);
                    if i >= end {
                        break;
                    }
                    let result = panic::catch_unwind(AssertUnwindSafe(|| body(i)));
                    if let Err(payload) = result {
                        let mut slot = captured_panic.lock().unwrap();
                        if slot.is_none() {
                            *slot = Some(payload);
                        }
                        break;
                    }
                }
            });
        }
    });

    if let Some(payload) = captured_panic.into_inner().unwrap() {
        panic::resume_unwind(payload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64 as Counter;
    use std::sync::Mutex as StdMutex;

    #[test]
    fn serial_path_visits_every_index_in_order() {
        let seen = StdMutex::new(Vec::new());
        parallel_for(0, 10, 1, |i| seen.lock().unwrap().push(i));
        assert_eq!(*seen.lock().unwrap(), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn parallel_path_visits_every_index_exactly_once() {
        let total = Counter::new(0);
        let count = Counter::new(0);
        parallel_for(0, 1000, 4, |i| {
            total.fetch_add(i, Ordering::Relaxed);
            count.fetch_add(1, Ordering::Relaxed);
        });
        assert_eq!(count.load(Ordering::Relaxed), 1000);
        assert_eq!(total.load(Ordering::Relaxed), (0..1000u64).sum::<u64>());
    }

    #[test]
    fn empty_range_is_a_no_op() {
        let hit = std::cell::Cell::new(false);
        parallel_for(5, 5, 4, |_| hit.set(true));
        assert!(!hit.get());
    }

    #[test]
    #[should_panic(expected = "boom")]
    fn panics_in_workers_are_re_raised_on_the_caller() {
        parallel_for(0, 8, 4, |i| {
            if i == 3 {
                panic!("boom");
            }
        });
    }
}
