use std::cell::{Cell, RefCell};
use std::collections::hash_map::RandomState;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use fixmemo::{Event, Fix, FixMemo, Fold, Memo, PolyCache, Sip, SyncMemoCache, Trace};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Shape {
    Circle(u32),
    Rect { w: u32, h: u32 },
}

#[test]
fn test_arities() {
    let zero = Memo::new(|| "nothing".to_string());
    assert_eq!(zero.call(()), "nothing");
    assert_eq!(zero.call(()), "nothing");
    assert_eq!(zero.cache().len(), 1);

    let one = Memo::new(|x: u8| x as u32 + 1);
    assert_eq!(one.call((255,)), 256);

    let three = Memo::new(|a: i64, b: i64, c: i64| a * b - c);
    assert_eq!(three.call((3, 4, 5)), 7);
    assert_eq!(three.call((4, 3, 5)), 7);
    assert_eq!(three.cache().len(), 2);

    let twelve = Memo::new(
        |a: u8, b: u8, c: u8, d: u8, e: u8, f: u8, g: u8, h: u8, i: u8, j: u8, k: u8, l: u8| {
            [a, b, c, d, e, f, g, h, i, j, k, l].iter().map(|&x| x as u32).sum::<u32>()
        },
    );
    assert_eq!(twelve.call((1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12)), 78);
    assert_eq!(twelve.call((12, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1)), 78);
    assert_eq!(twelve.cache().len(), 2);
}

#[test]
fn test_structured_arguments() {
    let runs = Rc::new(Cell::new(0));
    let area = Memo::new({
        let runs = runs.clone();
        move |shape: Shape| {
            runs.set(runs.get() + 1);
            match shape {
                Shape::Circle(r) => 3 * r * r,
                Shape::Rect { w, h } => w * h,
            }
        }
    });

    assert_eq!(area.call((Shape::Circle(2),)), 12);
    assert_eq!(area.call((Shape::Rect { w: 3, h: 4 },)), 12);
    assert_eq!(area.call((Shape::Rect { w: 3, h: 4 },)), 12);
    assert_eq!(area.call((Shape::Rect { w: 4, h: 3 },)), 12);
    assert_eq!(runs.get(), 3);

    let join = Memo::new(|parts: Vec<String>, sep: String| parts.join(&sep));
    let parts = vec!["a".to_string(), "b".to_string()];
    assert_eq!(join.call((parts.clone(), "-".into())), "a-b");
    assert_eq!(join.call((parts, "+".into())), "a+b");
    assert!(join.cache().contains(&(vec!["a".into(), "b".into()], "-".into())));
    assert_eq!(join.cache().get(&(vec![], "-".into())), None);
}

#[test]
fn test_combiners_agree() {
    let fold = Memo::new(|a: u64, b: String| b.repeat(a as usize));
    let sip = Memo::new(|a: u64, b: String| b.repeat(a as usize)).with_combiner(Sip);
    let random = Memo::new(|a: u64, b: String| b.repeat(a as usize))
        .with_combiner(Fold::with_hasher(RandomState::new()));

    for n in 0..20 {
        let expected = "ab".repeat(n as usize);
        assert_eq!(fold.call((n, "ab".into())), expected);
        assert_eq!(sip.call((n, "ab".into())), expected);
        assert_eq!(random.call((n, "ab".into())), expected);
    }

    assert_eq!(fold.cache().len(), 20);
    assert_eq!(sip.cache().len(), 20);
    assert_eq!(random.cache().len(), 20);
}

#[test]
fn test_observer() {
    let log = Rc::new(RefCell::new(vec![]));
    let square = Memo::new(|x: i32| x * x).observe({
        let log = log.clone();
        move |event: Event, key: &(i32,)| log.borrow_mut().push((event, key.0))
    });

    square.call((3,));
    square.call((3,));
    square.call((-3,));
    assert_eq!(
        *log.borrow(),
        [(Event::Miss, 3), (Event::Hit, 3), (Event::Miss, -3)]
    );
}

#[test]
fn test_trace_observer() {
    let fib = FixMemo::new(|fib: &Fix<(u32,), u64>, n: u32| {
        if n < 2 {
            n as u64
        } else {
            fib.call((n - 1,)) + fib.call((n - 2,))
        }
    })
    .observe(Trace::new("fib"));

    assert_eq!(fib.call((30,)), 832040);
    assert_eq!(fib.call((30,)), 832040);
    assert_eq!(fib.cache().len(), 31);
}

#[test]
fn test_poly_cache() {
    fn concat<T: ToString>((a, b): (T, T)) -> String {
        a.to_string() + &b.to_string()
    }

    let caches = PolyCache::new();
    assert_eq!(caches.get_or_compute((1u8, 2u8), concat), "12");
    assert_eq!(caches.get_or_compute((1u16, 2u16), concat), "12");
    assert_eq!(caches.get_or_compute(('x', 'y'), concat), "xy");
    assert_eq!(caches.get_or_compute((1u8, 2u8), concat), "12");
    assert_eq!(caches.len(), 3);

    let bytes = caches.cache_of::<fn((u8, u8)) -> String, (u8, u8), String>();
    assert!(bytes.is_empty());
}

#[test]
fn test_sync_cache() {
    let cache = SyncMemoCache::new();
    let runs = AtomicUsize::new(0);

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for n in 0..50u64 {
                    let value = cache.get_or_compute((n,), || {
                        runs.fetch_add(1, Ordering::Relaxed);
                        n * n
                    });
                    assert_eq!(value, n * n);
                }
            });
        }
    });

    assert_eq!(cache.len(), 50);
    assert!(runs.load(Ordering::Relaxed) >= 50);
    assert_eq!(cache.get(&(7,)), Some(49));
}
