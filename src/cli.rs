use std::f32::consts::TAU;

use anyhow::Context;
use minicull::{
    Camera, CullingBvh, QueryStack, Stats, TriangleSet,
    geometry::{WorldPoint, WorldVector},
    mirror::{Mirror, MirrorSet, View},
};
use rand::{SeedableRng, rngs::SmallRng};

const CAMERA_COUNT: usize = 8;
const MAX_REFLECTIONS: usize = 3;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let bvh = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading {path}");
            CullingBvh::with_obj(&path).with_context(|| format!("Loading {path}"))?
        }
        None => {
            let mut rng = SmallRng::seed_from_u64(0);
            let set = TriangleSet::random(&mut rng, 1000, 20, 200.0);
            log::info!(
                "Generated random scene with {} triangles",
                set.triangle_count()
            );
            set.build()
        }
    };
    log::info!("{}", bvh.statistics());

    let bounds = bvh.bounding_box();
    if bounds.is_empty() {
        log::warn!("Scene is empty, nothing to cull");
        return Ok(());
    }
    let target = bounds.center();
    let distance = bounds.size().norm().max(1.0);

    let mut stack = QueryStack::default();
    let mut visible = vec![false; bvh.source_count()];

    let ring_camera = |i: usize| {
        let angle = TAU * i as f32 / CAMERA_COUNT as f32;
        let center = target + WorldVector::new(angle.cos(), 0.3, angle.sin()) * distance;
        Camera::builder()
            .center(center)
            .forward(target - center)
            .up(WorldVector::y())
            .fov_y(1.0)
            .aspect(16.0 / 9.0)
            .near(0.1)
            .far(3.0 * distance)
            .build()
    };

    let visible_counts: Stats = (0..CAMERA_COUNT)
        .map(|i| {
            let camera = ring_camera(i);
            let frustum = camera.frustum();
            if !frustum.contains_point(&target) {
                log::warn!("Camera {i} doesn't see the center of the scene");
            }

            visible.fill(false);
            bvh.find_visible_sources(&frustum, &mut visible, &mut stack);
            let count = visible.iter().filter(|v| **v).count();
            log::info!(
                "Camera {i} at {:.1?}: {count} of {} sources visible",
                camera.center().coords.as_slice(),
                visible.len()
            );
            count
        })
        .collect();
    log::info!("Visible sources per camera: {visible_counts}");

    // Two parallel mirrors on opposite sides of the scene, the first camera between them
    let half = distance / 4.0;
    let mirrors = MirrorSet::new(vec![
        wall_mirror(target - WorldVector::x() * distance, half, WorldVector::x()),
        wall_mirror(target + WorldVector::x() * (1.5 * distance), half, -WorldVector::x()),
    ]);
    let views = mirrors.gather_views(View::from(&ring_camera(0)), MAX_REFLECTIONS);

    let mut visible_anywhere = vec![false; bvh.source_count()];
    for node in &views {
        visible.fill(false);
        bvh.find_visible_sources(&node.view.frustum, &mut visible, &mut stack);
        bvh.find_visible_sources(&node.view.frustum, &mut visible_anywhere, &mut stack);
        match node.mirror {
            None => log::info!(
                "Camera 0 directly: {} sources visible",
                visible.iter().filter(|v| **v).count()
            ),
            Some(mirror) => log::info!(
                "Through mirror {mirror} at depth {}: {} sources visible",
                node.depth,
                visible.iter().filter(|v| **v).count()
            ),
        }
    }
    log::info!(
        "Camera 0 with {} mirror views: {} of {} sources visible",
        views.len() - 1,
        visible_anywhere.iter().filter(|v| **v).count(),
        visible_anywhere.len()
    );

    Ok(())
}

/// Square mirror perpendicular to the x axis, centered at `center`, reflecting towards `facing`.
fn wall_mirror(center: WorldPoint, half: f32, facing: WorldVector) -> Mirror {
    let mut polygon = [
        WorldPoint::new(center.x, center.y - half, center.z - half),
        WorldPoint::new(center.x, center.y - half, center.z + half),
        WorldPoint::new(center.x, center.y + half, center.z + half),
        WorldPoint::new(center.x, center.y + half, center.z - half),
    ];
    // Clockwise when seen from +x
    if facing.x < 0.0 {
        polygon.reverse();
    }
    Mirror::new(&polygon)
}
