use std::time::Duration;

use facturation::infrastructure::instance::{InstanceRole, acquire};

#[tokio::test]
async fn test_second_instance_activates_the_first() {
    let InstanceRole::Primary(mut guard) = acquire(0).await.unwrap() else {
        panic!("ephemeral port already taken");
    };
    assert!(!guard.try_activation());

    let second = acquire(guard.port()).await.unwrap();
    assert!(matches!(second, InstanceRole::Secondary));

    let activation = tokio::time::timeout(Duration::from_secs(5), guard.next_activation())
        .await
        .expect("no activation received");
    assert_eq!(activation, Some(()));
}

#[tokio::test]
async fn test_stray_connections_do_not_activate() {
    let InstanceRole::Primary(mut guard) = acquire(0).await.unwrap() else {
        panic!("ephemeral port already taken");
    };

    {
        use tokio::io::AsyncWriteExt;
        let mut stream = tokio::net::TcpStream::connect(("127.0.0.1", guard.port()))
            .await
            .unwrap();
        stream.write_all(b"hello\n").await.unwrap();
        stream.shutdown().await.unwrap();
    }

    let activation =
        tokio::time::timeout(Duration::from_millis(300), guard.next_activation()).await;
    assert!(activation.is_err(), "unexpected activation");
}

#[tokio::test]
async fn test_silent_client_does_not_block_activation() {
    let InstanceRole::Primary(mut guard) = acquire(0).await.unwrap() else {
        panic!("ephemeral port already taken");
    };

    // Connected but never writes
    let _idle = tokio::net::TcpStream::connect(("127.0.0.1", guard.port()))
        .await
        .unwrap();

    let second = acquire(guard.port()).await.unwrap();
    assert!(matches!(second, InstanceRole::Secondary));

    let activation = tokio::time::timeout(Duration::from_secs(1), guard.next_activation())
        .await
        .expect("activation held up by idle client");
    assert_eq!(activation, Some(()));
}
