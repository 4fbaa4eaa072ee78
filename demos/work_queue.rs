use semfifo::Queue;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() {
    println!("Work Queue Example\n");

    const NUM_WORKERS: usize = 4;
    const NUM_JOBS: usize = 20;

    let jobs = Arc::new(Queue::<String, 8>::new());
    let results = Arc::new(Queue::<String, 8>::new());

    let jobs_tx = jobs.clone();
    let producer = thread::spawn(move || {
        for i in 0..NUM_JOBS {
            let job = format!("Job-{:02}", i);
            // Blocks while all 8 job slots are taken
            jobs_tx.send(job.clone()).unwrap();
            println!("Enqueued: {}", job);
            thread::sleep(Duration::from_millis(50));
        }
        println!("All jobs enqueued!");
    });

    let mut workers = vec![];
    for worker_id in 0..NUM_WORKERS {
        let jobs_rx = jobs.clone();
        let results_tx = results.clone();

        workers.push(thread::spawn(move || {
            let mut processed = 0;
            // A quiet half second means the producer is done
            while let Ok(job) = jobs_rx.recv_timeout(Duration::from_millis(500)) {
                println!("Worker {} processing: {}", worker_id, job);

                thread::sleep(Duration::from_millis(200));

                let result = format!("{} -> completed by worker {}", job, worker_id);
                results_tx.send(result).unwrap();

                processed += 1;
            }
            println!("Worker {} finished ({} jobs)", worker_id, processed);
        }));
    }

    let results_rx = results.clone();
    let collector = thread::spawn(move || {
        for _ in 0..NUM_JOBS {
            let result = results_rx.recv().unwrap();
            println!("Result: {}", result);
        }
        println!("All results collected!");
    });

    producer.join().unwrap();
    for worker in workers {
        worker.join().unwrap();
    }
    collector.join().unwrap();

    println!("\nWork queue example completed!");
}
