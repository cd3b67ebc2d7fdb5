use std::collections::HashSet;
use std::sync::Arc;

use integration_tests::Harness;
use uuid::Uuid;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn overlapping_bans_apply_each_identity_once() -> anyhow::Result<()> {
    let h = Arc::new(Harness::new());
    let players: Vec<Uuid> = (0..40)
        .map(|i| h.connect(&format!("p{i}"), &format!("203.0.113.{}", i % 4)))
        .collect();

    let mut tasks = Vec::new();
    for i in 0..4u8 {
        let exact = {
            let h = Arc::clone(&h);
            tokio::spawn(async move {
                let addr = format!("203.0.113.{i}").parse().expect("address");
                h.issuer
                    .ban_by_address(addr, Some("exact"), None, true, false)
                    .await
            })
        };
        let range = {
            let h = Arc::clone(&h);
            tokio::spawn(async move {
                let range = "203.0.113.0/30".parse().expect("range");
                h.issuer
                    .ban_by_range(range, Some("range"), None, true, false)
                    .await
            })
        };
        tasks.push(exact);
        tasks.push(range);
    }

    let mut banned = Vec::new();
    for task in tasks {
        let result = task.await?;
        banned.extend(result.players().iter().map(|p| p.key));
    }

    let unique: HashSet<Uuid> = banned.iter().copied().collect();
    assert_eq!(banned.len(), unique.len(), "an identity was banned twice");
    assert_eq!(unique.len(), players.len());
    for key in players {
        assert!(h.active_ban(key).is_some());
        assert_eq!(h.connections.kicks_for(key).len(), 1);
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_identity_bans_leave_one_winner() -> anyhow::Result<()> {
    let h = Arc::new(Harness::new());
    let key = Uuid::new_v4();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let h = Arc::clone(&h);
            tokio::spawn(async move {
                let reason = format!("ban {i}");
                h.issuer.ban_by_identity(key, Some(&reason), None, true).await
            })
        })
        .collect();

    let mut issued = Vec::new();
    for handle in handles {
        let result = handle.await?;
        assert!(result.is_clean());
        issued.push(result.bans()[0].id);
    }

    assert_eq!(h.registry.len(), 1);
    let active = h.active_ban(key).expect("banned");
    assert!(issued.contains(&active));
    Ok(())
}
