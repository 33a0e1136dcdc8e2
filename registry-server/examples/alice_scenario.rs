//! 登记流程演示程序
//!
//! 直接驱动 `SharedRegistry`：注册患者与从业者、上传治疗前后影像、付款关联、提交评价，
//! 并通过事件总线收集全部登记事件

use registry_core::{Identity, RegistryError};
use registry_engine::{Registry, SharedRegistry};
use registry_integration::{event_channel, InMemoryLedger, MemorySubscriber};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志
    tracing_subscriber::fmt::init();

    let alice = Identity::from("0xAlice");
    let admin = Identity::from("0xAdmin");
    let doctor = Identity::from("0xDrChen");

    // 创建账本与事件总线
    let ledger = Arc::new(InMemoryLedger::with_balances([(alice.clone(), 500)]));
    let (sink, mut dispatcher) = event_channel("alice-scenario");
    let memory = Arc::new(MemorySubscriber::new());
    dispatcher.subscribe(memory.clone());
    let dispatcher_handle = dispatcher.spawn();

    let registry = SharedRegistry::new(Registry::new(ledger.clone(), Arc::new(sink)));

    println!("🚀 治疗登记演示\n");

    // 1. 注册患者与从业者
    let patient_id = registry
        .register_patient(
            "Alice".to_string(),
            "1990-04-12".to_string(),
            58,
            165,
            "F".to_string(),
            &alice,
        )
        .await?;
    let practitioner_id = registry
        .register_practitioner(
            "Dr. Chen".to_string(),
            &doctor,
            "laser resurfacing".to_string(),
            &admin,
        )
        .await?;
    println!("✅ 患者 {} 与从业者 {} 已注册", patient_id, practitioner_id);

    // 2. 上传治疗前后影像
    let image_id = registry
        .upload_before_image(patient_id, "cidA".to_string(), &alice)
        .await?;
    registry
        .upload_after_image(image_id, "cidB".to_string(), &alice)
        .await?;
    let image = registry.image(image_id).await;
    println!(
        "✅ 影像 {}: {} -> {} (完成: {})",
        image.id, image.before_cid, image.after_cid, image.completed
    );

    // 3. 治疗后影像只能设置一次
    match registry
        .upload_after_image(image_id, "cidC".to_string(), &alice)
        .await
    {
        Err(RegistryError::AlreadyExists(message)) => println!("⚠️  重复上传被拒绝: {}", message),
        other => println!("❓ 意外结果: {:?}", other),
    }

    // 4. 付款关联，第二次余额不足并回滚
    registry
        .link_patient_to_practitioner(patient_id, practitioner_id, &alice, 300)
        .await?;
    if let Err(e) = registry
        .link_patient_to_practitioner(patient_id, practitioner_id, &alice, 300)
        .await
    {
        println!("⚠️  第二次关联失败: {}", e);
    }
    println!(
        "💰 余额 {}: {}, {}: {}",
        alice,
        ledger.balance(&alice),
        doctor,
        ledger.balance(&doctor)
    );

    // 5. 提交评价
    for (rating, comment) in [(4, "smooth recovery"), (2, "follow-up delayed"), (5, "great result")] {
        registry
            .submit_review(patient_id, practitioner_id, rating, comment.to_string(), &doctor)
            .await?;
        let practitioner = registry.practitioner(practitioner_id).await;
        println!("⭐ 评分 {} -> 星级 {}", rating, practitioner.star_rating);
    }

    // 6. 显示统计
    let stats = registry.stats().await;
    println!("\n📊 登记统计:");
    println!("   患者: {}", stats.total_patients);
    println!("   从业者: {}", stats.total_practitioners);
    println!("   影像: {} (已完成 {})", stats.total_images, stats.completed_images);
    println!("   评价: {}", stats.total_reviews);

    // 7. 关闭事件通道并列出收到的事件
    drop(registry);
    let dispatched = dispatcher_handle.await?;
    println!("\n📨 已分发 {} 个事件:", dispatched);
    for envelope in memory.envelopes().await {
        println!("   - {} {}", envelope.timestamp.format("%H:%M:%S%.3f"), envelope.event.kind());
    }

    println!("\n🎉 演示完成");
    Ok(())
}
