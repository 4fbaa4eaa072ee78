//! Simple usage example

use semfifo::{Queue, SemError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() {
    println!("semfifo - Simple Example\n");

    // Create a queue with 4 slots
    let queue = Arc::new(Queue::<String, 4>::new());

    let producer_queue = queue.clone();
    let consumer_queue = queue.clone();

    // Producer thread: send blocks whenever the 4 slots are occupied
    let producer = thread::spawn(move || {
        for i in 0..10 {
            let message = format!("Message {}", i);
            println!("Sending: {}", message);
            producer_queue.send(message).unwrap();
        }
        println!("Producer finished!");
    });

    // Consumer thread: recv blocks until a message arrives
    let consumer = thread::spawn(move || {
        for _ in 0..10 {
            let message = consumer_queue.recv().unwrap();
            println!("Received: {}", message);

            // Slow consumer: the producer fills the queue and parks
            thread::sleep(Duration::from_millis(50));
        }
        println!("Consumer finished!");
    });

    producer.join().unwrap();
    consumer.join().unwrap();

    // Bounded wait on the now-empty queue
    match queue.recv_timeout(Duration::from_millis(100)) {
        Err(SemError::TimedOut) => println!("\nNo more messages within 100ms, as expected."),
        other => println!("\nUnexpected outcome: {:?}", other),
    }

    println!("Example completed successfully!");
}
