use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use menagerie_gameplay::{AttackProfile, Faction, Services, SpawnParams, World, WorldSettings};
use menagerie_common::Vec3;

fn populated_world(hostiles: usize) -> World {
    let mut world = World::new(Services::new(), WorldSettings::default(), 7);
    let mut rng = fastrand::Rng::with_seed(7);
    let mut place = move || Vec3::new(rng.f32() * 70.0 - 35.0, 0.0, rng.f32() * 70.0 - 35.0);

    let player = world
        .spawn(&SpawnParams::new(Faction::Player, Vec3::ZERO))
        .expect("spawn player");
    for _ in 0..hostiles / 4 {
        world
            .spawn(&SpawnParams::ally(place(), player))
            .expect("spawn ally");
    }
    for _ in 0..hostiles {
        let harmless = AttackProfile::default().with_base_damage(0.0);
        world
            .spawn(&SpawnParams::hostile(place()).with_attack(harmless))
            .expect("spawn hostile");
    }
    world
}

fn bench_world_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("world_tick");
    for hostiles in [16, 64, 256] {
        group.bench_with_input(BenchmarkId::from_parameter(hostiles), &hostiles, |b, &n| {
            let mut world = populated_world(n);
            b.iter(|| black_box(world.tick(black_box(1.0 / 60.0))));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_world_tick);
criterion_main!(benches);
