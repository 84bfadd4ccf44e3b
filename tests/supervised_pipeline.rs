use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, Instant};

use steward::{
    heartbeat::{Launch, Ward, WardFn},
    streams::{drain, take, tee},
    supervise, CancellationToken, EventKind, Steward, StewardConfig, WardError,
};

const HOUR: Duration = Duration::from_secs(3600);

async fn ints(mut ward: Ward<i64>) -> Result<(), WardError> {
    for v in [1, 2, -1, 3, 4, 5] {
        if v < 0 {
            return Err(WardError::fail(format!("negative value: {v}")));
        }
        ward.send(v).await?;
    }
    Ok(())
}

async fn collect<T>(mut rx: tokio::sync::mpsc::Receiver<T>) -> Vec<T> {
    let mut out = Vec::new();
    while let Some(v) = rx.recv().await {
        out.push(v);
    }
    out
}

#[tokio::test(start_paused = true)]
async fn generations_are_spliced_into_one_stream() {
    let steward = supervise(Duration::from_millis(50), WardFn::new("ints", ints)).unwrap();
    let done = CancellationToken::new();

    let (_pulses, results) = steward.launch(done.clone(), HOUR);
    let got = collect(take(done.clone(), results, 6)).await;
    assert_eq!(got, vec![1, 2, 1, 2, 1, 2]);
    done.cancel();
}

#[tokio::test(start_paused = true)]
async fn cancel_closes_supervised_pipeline() {
    let steward = supervise(Duration::from_millis(50), WardFn::new("ints", ints)).unwrap();
    let done = CancellationToken::new();
    let (mut pulses, results) = steward.launch(done.clone(), Duration::from_millis(10));
    let mut out = drain(done.clone(), results);

    assert_eq!(out.recv().await, Some(1));
    done.cancel();
    assert_eq!(out.recv().await, None);
    assert!(time::timeout(Duration::from_secs(1), async {
        while pulses.recv().await.is_some() {}
    })
    .await
    .is_ok());
}

#[tokio::test(start_paused = true)]
async fn tee_over_supervised_stream_sees_every_value_twice() {
    let steward = supervise(Duration::from_millis(50), WardFn::new("ints", ints)).unwrap();
    let done = CancellationToken::new();
    let (_pulses, results) = steward.launch(done.clone(), HOUR);
    let (a, b) = tee(done.clone(), take(done.clone(), results, 4));

    let (a, b) = tokio::join!(collect(a), collect(b));
    assert_eq!(a, vec![1, 2, 1, 2]);
    assert_eq!(a, b);
    done.cancel();
}

#[tokio::test(start_paused = true)]
async fn steward_of_steward_keeps_data_flowing() {
    let launches = Arc::new(AtomicUsize::new(0));
    let counted = {
        let launches = Arc::clone(&launches);
        WardFn::new("counted", move |ward: Ward<i64>| {
            launches.fetch_add(1, Ordering::SeqCst);
            ints(ward)
        })
    };

    let inner = supervise(Duration::from_millis(20), counted).unwrap();
    let outer = Steward::builder(StewardConfig {
        name: "outer".into(),
        timeout: Duration::from_millis(500),
        ..StewardConfig::default()
    })
    .build(inner)
    .unwrap();
    let mut events = outer.subscribe();

    let done = CancellationToken::new();
    let start = Instant::now();
    let (_pulses, results) = outer.launch(done.clone(), HOUR);
    let got = collect(take(done.clone(), results, 10)).await;

    assert_eq!(got, vec![1, 2, 1, 2, 1, 2, 1, 2, 1, 2]);
    assert!(launches.load(Ordering::SeqCst) >= 5);
    assert!(start.elapsed() < Duration::from_millis(500));
    while let Ok(ev) = events.try_recv() {
        assert_ne!(ev.kind, EventKind::WardUnhealthy, "outer restarted inner");
    }
    done.cancel();
}
