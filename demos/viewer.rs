use anyhow::Context;
use macroquad::prelude::*;
use macroquad_tileworld::{MacroquadBackend, SpriteAtlas, TileWorld, ViewConfig};

const CELL: u16 = 16;
const SPEED: f32 = 180.0;

fn window_conf() -> Conf {
    Conf {
        window_title: "Tile World Viewer".into(),
        window_width: 1280,
        window_height: 720,
        ..Default::default()
    }
}

/// 4x4 sheet of flat colored cells, standing in for `terrain.png`.
fn terrain_sheet() -> Texture2D {
    let size = CELL * 4;
    let mut img = Image::gen_image_color(size, size, BLANK);
    for i in 0..16u32 {
        let (col, row) = (i % 4, i / 4);
        let shade = 0.25 + 0.05 * i as f32;
        let color = Color::new(shade * (col as f32 + 1.0) / 4.0, shade, shade * (row as f32 + 1.0) / 4.0, 1.0);
        for y in 0..CELL as u32 {
            for x in 0..CELL as u32 {
                let edge = x == 0 || y == 0;
                let c = if edge { Color::new(0.0, 0.0, 0.0, 0.4) } else { color };
                img.set_pixel(col * CELL as u32 + x, row * CELL as u32 + y, c);
            }
        }
    }
    let tex = Texture2D::from_image(&img);
    tex.set_filter(FilterMode::Nearest);
    tex
}

async fn run() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let map_path = args.next().unwrap_or_else(|| "assets/demo.tmx".to_owned());
    let cfg = match args.next() {
        Some(path) => ViewConfig::load(&path).with_context(|| format!("reading view config {path}"))?,
        None => ViewConfig {
            screen_width: screen_width(),
            screen_height: screen_height(),
            zoom: 4.0,
            ..Default::default()
        },
    };

    let mut world = TileWorld::new(&cfg);
    world
        .load(&map_path)
        .with_context(|| format!("loading {map_path}"))?;

    let mut atlas = SpriteAtlas::new();
    atlas.register_texture(0, terrain_sheet());
    atlas.add_grid_sprites(0, Vec2::ZERO, vec2(CELL as f32, CELL as f32), 4, 4);

    let mut player = world
        .query_objects_by_type("spawn")
        .first()
        .map(|o| o.bounds.point())
        .unwrap_or_default();

    loop {
        let dt = get_frame_time();
        let mut dir = Vec2::ZERO;
        if is_key_down(KeyCode::A) || is_key_down(KeyCode::Left) {
            dir.x -= 1.0;
        }
        if is_key_down(KeyCode::D) || is_key_down(KeyCode::Right) {
            dir.x += 1.0;
        }
        if is_key_down(KeyCode::W) || is_key_down(KeyCode::Up) {
            dir.y -= 1.0;
        }
        if is_key_down(KeyCode::S) || is_key_down(KeyCode::Down) {
            dir.y += 1.0;
        }
        let next = player + dir.normalize_or_zero() * SPEED * dt;
        // stay on the map
        if world.point_in_map(next) {
            player = next;
        }
        if is_key_pressed(KeyCode::R) {
            if let Err(e) = world.load(&map_path) {
                log::warn!("reload failed, keeping current map: {e}");
            }
        }

        world.resize(vec2(screen_width(), screen_height()));
        world.set_visible_point(player);

        clear_background(BLACK);
        set_camera(&world.camera().to_camera2d());
        let stats = world.draw(&mut MacroquadBackend, &atlas)?;
        draw_circle(player.x, player.y, 3.0, RED);
        set_default_camera();

        draw_text(
            &format!(
                "FPS: {}  tiles: {} drawn / {} culled",
                get_fps(),
                stats.tiles_drawn,
                stats.tiles_culled
            ),
            20.0,
            30.0,
            24.0,
            WHITE,
        );

        next_frame().await;
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("viewer: {e:#}");
    }
}
