/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

#![allow(unused)]

use std::{collections::HashMap, fs, sync::{Arc,Mutex}};
use chrono::{DateTime,Local,TimeZone,TimeDelta,Utc};
use image::{Rgb,Rgba,RgbaImage};
use odin_flightart::{
    WHITE, BLACK, RED, CLEAR,
    LabelConfig, LabelFont, SummaryBox, SummaryConfig, SummaryItem,
    archive::{archive_filename,Archive},
    display::{quantize_tri_color,FileMatrix,FilePanel,PanelDisplay,PixelMatrix},
    feed::AircraftSnapshot,
    fonts::FontLibrary,
    label::{create_label_strategy,LabelPlan,LabelPlanner,LabelStrategy,NoLabels,RotatedCallsignLabels},
    matrix::{mirror_writes,pixel_writes,PixelWrite},
    projection::{BoundingBox,CanvasRegion,ClipPolicy,GeoPos,Orientation,PixelPoint,Projector},
    render::{draw_polyline,Canvas,TrackRenderer},
    stats::SessionStats,
    store::{HistoryPolicy,TrackEntry,TrackStore},
    style::{create_rng,FixedStyle,HeadTailStyle,TrackStyle},
    summary::{expand_template,SummaryOverlay,TextAnchor},
    OdinFlightArtError
};

const TEST_FONT: &str = concat!( env!("CARGO_MANIFEST_DIR"), "/resources/DejaVuSansMono.ttf");

fn test_fonts ()->FontLibrary {
    let mut paths = HashMap::new();
    paths.insert( "mono".to_string(), TEST_FONT.to_string());
    FontLibrary::load( &paths).unwrap()
}

/// (x_min,y_min,x_max,y_max) of all pixels that are not white
fn drawn_extent (img: &RgbaImage)->Option<(u32,u32,u32,u32)> {
    let mut ext: Option<(u32,u32,u32,u32)> = None;
    for (x,y,px) in img.enumerate_pixels() {
        if *px != Rgba(WHITE) {
            ext = Some( match ext {
                Some((x0,y0,x1,y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                None => (x,y,x,y)
            });
        }
    }
    ext
}

fn count_pixels (img: &RgbaImage, f: impl Fn(&Rgba<u8>)->bool)->usize {
    img.pixels().filter( |p| f(p)).count()
}

fn reddish (p: &Rgba<u8>)->bool { p[0] > 150 && p[1] < 60 && p[2] < 60 }
fn darkish (p: &Rgba<u8>)->bool { p[0] < 60 && p[1] < 60 && p[2] < 60 }

fn t0 ()->DateTime<Utc> { Utc.with_ymd_and_hms( 2025, 7, 1, 12, 0, 0).unwrap() }

fn white_image (w: u32, h: u32)->RgbaImage { RgbaImage::from_pixel( w, h, Rgba(WHITE)) }

fn is_red (img: &RgbaImage, x: u32, y: u32)->bool { *img.get_pixel( x, y) == Rgba(RED) }

//--- polylines

#[test]
fn test_thick_segment_with_caps () {
    let mut img = white_image( 40, 20);
    draw_polyline( &mut img, &[PixelPoint::new( 10, 10), PixelPoint::new( 30, 10)], Rgba(RED), 8);

    assert!( is_red( &img, 20, 10));
    assert!( is_red( &img, 20, 7));
    assert!( is_red( &img, 7, 10));  // round cap extends past the start point
    assert!( is_red( &img, 33, 10)); // .. and the end point
    assert!( !is_red( &img, 20, 18));
    assert!( !is_red( &img, 1, 10));
}

#[test]
fn test_joints_and_duplicates () {
    let mut img = white_image( 40, 40);
    let pts = [ PixelPoint::new( 5, 5), PixelPoint::new( 5, 5), PixelPoint::new( 20, 5), PixelPoint::new( 20, 30), PixelPoint::new( 20, 30) ];
    draw_polyline( &mut img, &pts, Rgba(RED), 6);

    assert!( is_red( &img, 12, 5));
    assert!( is_red( &img, 20, 15));
    assert!( is_red( &img, 22, 4)); // outer corner covered by the round joint
    assert!( !is_red( &img, 35, 35));
}

#[test]
fn test_out_of_bounds_points_are_clipped () {
    let mut img = white_image( 20, 20);
    draw_polyline( &mut img, &[PixelPoint::new( -50, 10), PixelPoint::new( 70, 10)], Rgba(RED), 4);
    assert!( is_red( &img, 0, 10));
    assert!( is_red( &img, 19, 10));
}

#[test]
fn test_single_point_and_hairline () {
    let mut img = white_image( 20, 20);
    draw_polyline( &mut img, &[PixelPoint::new( 10, 10)], Rgba(RED), 4);
    assert!( is_red( &img, 10, 10));
    assert!( is_red( &img, 11, 10));

    let mut img = white_image( 20, 20);
    draw_polyline( &mut img, &[PixelPoint::new( 2, 2), PixelPoint::new( 2, 17)], Rgba(RED), 1);
    assert!( is_red( &img, 2, 10));
    assert!( !is_red( &img, 4, 10));

    let mut img = white_image( 20, 20);
    draw_polyline( &mut img, &[], Rgba(RED), 4);
    assert!( img.pixels().all( |p| *p == Rgba(WHITE)));
}

//--- track renderer

fn fixed_store (policy: HistoryPolicy)->TrackStore {
    let style = TrackStyle { primary: Rgba(RED), secondary: Rgba(RED), width: 4 };
    TrackStore::new( policy, 10000.0, Box::new( FixedStyle(style)), t0())
}

fn test_projector (clip: ClipPolicy)->Projector {
    let bbox = BoundingBox::from_corners( GeoPos::new( 47.0, -123.0), GeoPos::new( 48.0, -122.0));
    Projector::new( bbox, CanvasRegion::new( 0, 0, 99, 99), Orientation{ invert_x: false, invert_y: true }, clip).unwrap()
}

#[test]
fn test_track_renderer () {
    let mut store = fixed_store( HistoryPolicy::Unbounded);
    store.upsert( &AircraftSnapshot::new( "a1", 47.2, -122.8, 3000.0, t0()), t0());
    store.upsert( &AircraftSnapshot::new( "a1", 47.8, -122.2, 3000.0, t0()), t0());
    store.upsert( &AircraftSnapshot::new( "a2", 47.5, -122.5, 3000.0, t0()), t0());

    let projector = test_projector( ClipPolicy::Keep);
    let mut canvas = Canvas::new( 100, 100, WHITE);
    let mut renderer = TrackRenderer::new( Box::new( NoLabels));

    assert_eq!( renderer.render( &mut canvas, &store, &projector), 2);

    let a = projector.project( &GeoPos::new( 47.2, -122.8));
    let b = projector.project( &GeoPos::new( 47.8, -122.2));
    let c = projector.project( &GeoPos::new( 47.5, -122.5));
    assert!( is_red( canvas.image(), a.x as u32, a.y as u32));
    assert!( is_red( canvas.image(), b.x as u32, b.y as u32));
    assert!( is_red( canvas.image(), c.x as u32, c.y as u32));
    assert!( !is_red( canvas.image(), 95, 95));

    // rendering does not touch the store
    assert_eq!( store.len(), 2);
    assert_eq!( store.get("a1").unwrap().len(), 2);
}

/// remembers which tracks it was asked to label
struct RecordingLabels {
    calls: Arc<Mutex<Vec<String>>>,
}

impl LabelStrategy for RecordingLabels {
    fn draw_label (&mut self, _img: &mut RgbaImage, entry: &TrackEntry, region: &CanvasRegion) {
        assert_eq!( *region, CanvasRegion::new( 0, 0, 99, 99));
        self.calls.lock().unwrap().push( entry.identity.clone());
    }
}

#[test]
fn test_labels_follow_drawn_tracks () {
    let mut store = fixed_store( HistoryPolicy::Unbounded);
    store.upsert( &AircraftSnapshot::new( "c3", 47.2, -122.8, 3000.0, t0()), t0());
    store.upsert( &AircraftSnapshot::new( "a1", 49.5, -122.5, 3000.0, t0()), t0()); // dropped by the clip policy
    store.upsert( &AircraftSnapshot::new( "b2", 47.5, -122.5, 3000.0, t0()), t0());
    store.upsert( &AircraftSnapshot::new( "c3", 47.3, -122.7, 3000.0, t0()), t0());

    let calls = Arc::new( Mutex::new( Vec::new()));
    let mut renderer = TrackRenderer::new( Box::new( RecordingLabels{ calls: calls.clone() }));
    let mut canvas = Canvas::new( 100, 100, WHITE);

    assert_eq!( renderer.render( &mut canvas, &store, &test_projector( ClipPolicy::Drop)), 2);
    assert_eq!( *calls.lock().unwrap(), vec![ "c3".to_string(), "b2".to_string() ]);

    renderer.render( &mut canvas, &store, &test_projector( ClipPolicy::Drop));
    assert_eq!( calls.lock().unwrap().len(), 4);
}

#[test]
fn test_canvas_layers () {
    let bg = RgbaImage::from_pixel( 10, 10, Rgba(BLACK));
    let mut frame = RgbaImage::from_pixel( 10, 10, Rgba(CLEAR));
    frame.put_pixel( 0, 0, Rgba(RED));

    let mut canvas = Canvas::new( 10, 10, WHITE).with_background( bg).with_frame( frame);
    assert_eq!( *canvas.image().get_pixel( 5, 5), Rgba(BLACK));

    canvas.image_mut().put_pixel( 5, 5, Rgba(WHITE));
    canvas.apply_frame();
    assert_eq!( *canvas.image().get_pixel( 0, 0), Rgba(RED));
    assert_eq!( *canvas.image().get_pixel( 5, 5), Rgba(WHITE)); // transparent frame pixels keep the tracks

    canvas.reset();
    assert_eq!( *canvas.image().get_pixel( 5, 5), Rgba(BLACK));
    assert_eq!( canvas.to_rgb().get_pixel( 5, 5), &Rgb([0,0,0]));
}

//--- labels

#[test]
fn test_label_planner () {
    let region = CanvasRegion::new( 76, 93, 330, 510);
    let palette = vec![ Rgba(BLACK), Rgba(RED), Rgba(WHITE) ];
    let mut planner = LabelPlanner::new( create_rng( Some(5), 1), 3, palette.clone(), (2,8));

    for _ in 0..200 {
        let plan = planner.plan( "ASA123", &region).unwrap();
        assert_eq!( plan.text, "ASA123");
        assert!( plan.font_idx < 3);
        assert_ne!( plan.fill, plan.stroke);
        assert!( palette.contains( &plan.fill) && palette.contains( &plan.stroke));
        assert!( plan.stroke_width >= 2 && plan.stroke_width < 8);
        assert!( plan.rotation_deg < 360);
        assert!( plan.center.x >= 76 && plan.center.x <= 406);
        assert!( plan.center.y >= 93 && plan.center.y <= 603);
    }
}

#[test]
fn test_label_planner_is_seeded () {
    let region = CanvasRegion::new( 0, 0, 100, 100);
    let palette = vec![ Rgba(BLACK), Rgba(RED) ];

    let mut p1 = LabelPlanner::new( create_rng( Some(9), 1), 2, palette.clone(), (2,8));
    let mut p2 = LabelPlanner::new( create_rng( Some(9), 1), 2, palette, (2,8));
    for _ in 0..10 {
        assert_eq!( p1.plan( "X", &region), p2.plan( "X", &region));
    }
}

#[test]
fn test_label_planner_needs_two_colors_and_a_font () {
    let region = CanvasRegion::new( 0, 0, 100, 100);

    let mut planner = LabelPlanner::new( create_rng( Some(1), 1), 1, vec![ Rgba(RED), Rgba(RED) ], (2,8));
    assert!( planner.plan( "X", &region).is_none());

    let mut planner = LabelPlanner::new( create_rng( Some(1), 1), 0, vec![ Rgba(RED), Rgba(BLACK) ], (2,8));
    assert!( planner.plan( "X", &region).is_none());
}

fn label_config (palette: Vec<[u8;4]>)->LabelConfig {
    LabelConfig { enabled: true, fonts: vec![ LabelFont{ font: "mono".into(), size: 40.0 } ], palette, stroke_width: (2,3) }
}

fn red_label (rotation_deg: u32)->LabelPlan {
    LabelPlan {
        text: "ASA123".into(),
        font_idx: 0,
        fill: Rgba(RED),
        stroke: Rgba(BLACK),
        stroke_width: 2,
        rotation_deg,
        center: PixelPoint::new( 150, 150)
    }
}

#[test]
fn test_render_label () {
    let fonts = test_fonts();
    let labels = RotatedCallsignLabels::new( &label_config( vec![RED, BLACK]), &fonts, create_rng( Some(3), 1)).unwrap();

    let mut img = white_image( 300, 300);
    labels.render( &mut img, &red_label( 0));
    let (x0,y0,x1,y1) = drawn_extent( &img).unwrap();
    assert!( x1 - x0 > y1 - y0); // horizontal text
    assert!( x0 > 50 && x1 < 250 && y0 > 100 && y1 < 200); // centered
    assert!( x0 < 150 && x1 > 150);
    assert!( count_pixels( &img, reddish) > 0);
    assert!( count_pixels( &img, darkish) > 0); // stroke

    let mut img = white_image( 300, 300);
    labels.render( &mut img, &red_label( 90));
    let (x0,y0,x1,y1) = drawn_extent( &img).unwrap();
    assert!( y1 - y0 > x1 - x0); // rotated
    assert!( y0 < 150 && y1 > 150);
}

#[test]
fn test_label_strategy_from_config () {
    let fonts = test_fonts();
    let region = CanvasRegion::new( 20, 20, 160, 160);
    let mut store = fixed_store( HistoryPolicy::Unbounded);
    store.upsert( &AircraftSnapshot::new( "a1", 47.5, -122.5, 3000.0, t0()).with_callsign("ASA123"), t0());
    store.upsert( &AircraftSnapshot::new( "a2", 47.6, -122.5, 3000.0, t0()), t0());

    let mut labels = create_label_strategy( &label_config( vec![RED, BLACK]), &fonts, create_rng( Some(7), 1)).unwrap();

    // no callsign, no label
    let mut img = white_image( 200, 200);
    labels.draw_label( &mut img, store.get("a2").unwrap(), &region);
    assert!( drawn_extent( &img).is_none());

    let mut img = white_image( 200, 200);
    labels.draw_label( &mut img, store.get("a1").unwrap(), &region);
    assert!( drawn_extent( &img).is_some());

    // disabled labels don't draw anything
    let mut config = label_config( vec![RED, BLACK]);
    config.enabled = false;
    let mut labels = create_label_strategy( &config, &fonts, create_rng( Some(7), 1)).unwrap();
    let mut img = white_image( 200, 200);
    labels.draw_label( &mut img, store.get("a1").unwrap(), &region);
    assert!( drawn_extent( &img).is_none());
}

#[test]
fn test_unknown_label_font () {
    let res = RotatedCallsignLabels::new( &label_config( vec![RED, BLACK]), &FontLibrary::new(), create_rng( Some(3), 1));
    assert!( matches!( res, Err(OdinFlightArtError::ConfigError(_))));
}

//--- matrix

#[test]
fn test_matrix_pixel_writes () {
    let mut store = TrackStore::new( HistoryPolicy::Bounded(10), 10000.0, Box::new( HeadTailStyle::new( create_rng( Some(2), 0))), t0());
    store.upsert( &AircraftSnapshot::new( "a1", 47.2, -122.8, 3000.0, t0()), t0());
    store.upsert( &AircraftSnapshot::new( "a1", 47.3, -122.7, 3000.0, t0()), t0());
    store.upsert( &AircraftSnapshot::new( "a1", 47.4, -122.6, 3000.0, t0()), t0());
    store.upsert( &AircraftSnapshot::new( "a2", 49.0, -122.5, 3000.0, t0()), t0()); // off-matrix

    let projector = test_projector( ClipPolicy::Drop);
    let writes = pixel_writes( &store, &projector);
    assert_eq!( writes.len(), 3);

    let style = *store.get("a1").unwrap().style();
    assert_eq!( writes[0].color, style.secondary);
    assert_eq!( writes[1].color, style.secondary);
    assert_eq!( writes[2].color, style.primary);

    let head = projector.project( &GeoPos::new( 47.4, -122.6));
    assert_eq!( (writes[2].x, writes[2].y), (head.x, head.y));

    let mut img = RgbaImage::from_pixel( 100, 100, Rgba(BLACK));
    mirror_writes( &mut img, &writes);
    assert_eq!( *img.get_pixel( head.x as u32, head.y as u32), style.primary);
}

#[test]
fn test_file_matrix_ignores_out_of_bounds () {
    let mut matrix = FileMatrix::new( std::env::temp_dir().join("odin_flightart_unused.png"), 32, 64);
    matrix.set_pixel( 31, 63, 255, 0, 0);
    matrix.set_pixel( 32, 0, 255, 0, 0);
    matrix.set_pixel( -1, 5, 255, 0, 0);
    assert_eq!( matrix.framebuffer().get_pixel( 31, 63), &Rgb([255,0,0]));
    assert_eq!( matrix.framebuffer().pixels().filter( |p| p[0] == 255).count(), 1);

    matrix.clear();
    assert!( matrix.framebuffer().pixels().all( |p| *p == Rgb([0,0,0])));
}

//--- panel

#[test]
fn test_tri_color_quantization () {
    assert_eq!( quantize_tri_color( &Rgb([250,10,10])), Rgb([255,0,0]));
    assert_eq!( quantize_tri_color( &Rgb([30,30,30])), Rgb([0,0,0]));
    assert_eq!( quantize_tri_color( &Rgb([200,200,200])), Rgb([255,255,255]));
}

#[test]
fn test_panel_size_mismatch () {
    let mut panel = FilePanel::new( std::env::temp_dir().join("odin_flightart_never_written.png"), 480, 800, 3, true);
    let img = image::RgbImage::new( 800, 480);
    assert!( matches!( panel.commit( &img), Err(OdinFlightArtError::DeviceWriteFailure(_))));
    assert_eq!( panel.n_commits(), 0);
}

//--- summary and archive

#[test]
fn test_expand_template () {
    let mut stats = SessionStats::new( t0());
    stats.distinct_aircraft_count = 42;
    stats.max_speed = 480.4;
    stats.max_altitude = 9125.0;
    stats.close( t0() + TimeDelta::hours(1));
    let now = t0() + TimeDelta::minutes(61);

    assert_eq!( expand_template( "Saw {count} airplanes.", &stats, now), "Saw 42 airplanes.");
    assert_eq!( expand_template( "{max_speed} kn, {max_altitude} ft", &stats, now), "480 kn, 9125 ft");

    let start = t0().with_timezone(&Local).format("%Y-%m-%d").to_string();
    assert_eq!( expand_template( "{start:%Y-%m-%d}", &stats, now), start);

    let end = (t0() + TimeDelta::hours(1)).with_timezone(&Local).format("%H:%M").to_string();
    assert_eq!( expand_template( "{end}", &stats, now), end);

    assert_eq!( expand_template( "{unknown} {count", &stats, now), "{unknown} {count");
    assert_eq!( expand_template( "no placeholders", &stats, now), "no placeholders");
}

#[test]
fn test_text_anchor () {
    assert_eq!( TextAnchor::LeftTop.top_left( 100, 50, 40, 10), (100, 50));
    assert_eq!( TextAnchor::LeftMiddle.top_left( 100, 50, 40, 10), (100, 45));
    assert_eq!( TextAnchor::MiddleMiddle.top_left( 100, 50, 40, 10), (80, 45));
}

fn summary_box (x: i32, y: i32, width: u32, height: u32)->SummaryBox {
    SummaryBox { x, y, width, height, fill: Some(BLACK), outline: Some(RED), outline_width: 2 }
}

#[test]
fn test_summary_boxes () {
    let config = SummaryConfig { boxes: vec![ summary_box( 10, 10, 20, 10), summary_box( 50, 50, 0, 10) ], items: vec![] };
    let overlay = SummaryOverlay::new( &config, &FontLibrary::new()).unwrap();

    let mut img = white_image( 100, 100);
    overlay.draw( &mut img, &SessionStats::new( t0()), t0());

    assert!( is_red( &img, 10, 10));  // outer outline
    assert!( is_red( &img, 29, 19));
    assert!( is_red( &img, 11, 11));  // second outline ring
    assert!( is_red( &img, 28, 15));
    assert_eq!( *img.get_pixel( 15, 15), Rgba(BLACK)); // fill
    assert_eq!( *img.get_pixel( 30, 10), Rgba(WHITE));
    assert_eq!( *img.get_pixel( 10, 20), Rgba(WHITE));

    // the empty box is ignored
    assert_eq!( count_pixels( &img, |p| *p != Rgba(WHITE)), 20*10);
}

#[test]
fn test_summary_text () {
    let fonts = test_fonts();
    let item = |text: &str, x: i32, y: i32, anchor: TextAnchor| SummaryItem {
        text: text.into(), font: "mono".into(), size: 20.0, x, y, anchor, color: BLACK
    };

    let mut stats = SessionStats::new( t0());
    stats.distinct_aircraft_count = 42;

    let config = SummaryConfig { boxes: vec![], items: vec![ item( "Saw {count} airplanes.", 10, 10, TextAnchor::LeftTop) ] };
    let overlay = SummaryOverlay::new( &config, &fonts).unwrap();
    let mut img = white_image( 400, 100);
    overlay.draw( &mut img, &stats, t0());

    let (x0,y0,x1,y1) = drawn_extent( &img).unwrap();
    assert!( x0 >= 8 && x0 < 20);
    assert!( y0 >= 8 && y1 <= 45);
    assert!( x1 > 150); // "Saw 42 airplanes." at ~12px per character

    let config = SummaryConfig { boxes: vec![], items: vec![ item( "{count}", 200, 50, TextAnchor::MiddleMiddle) ] };
    let overlay = SummaryOverlay::new( &config, &fonts).unwrap();
    let mut img = white_image( 400, 100);
    overlay.draw( &mut img, &stats, t0());

    let (x0,y0,x1,y1) = drawn_extent( &img).unwrap();
    assert!( ((x0 + x1) as i32 / 2 - 200).abs() <= 6);
    assert!( ((y0 + y1) as i32 / 2 - 50).abs() <= 10);
}

#[test]
fn test_unknown_summary_font () {
    let config = SummaryConfig { boxes: vec![], items: vec![ SummaryItem {
        text: "{count}".into(), font: "nope".into(), size: 20.0, x: 0, y: 0, anchor: TextAnchor::LeftTop, color: BLACK
    }]};
    assert!( matches!( SummaryOverlay::new( &config, &test_fonts()), Err(OdinFlightArtError::ConfigError(_))));
}

#[test]
fn test_archive_filename () {
    let t = Local.with_ymd_and_hms( 2025, 7, 1, 13, 5, 9).unwrap();
    assert_eq!( archive_filename( t, "epd_art"), "20250701_130509_epd_art.png");
}

#[test]
fn test_archive_same_second () {
    let dir = std::env::temp_dir().join( format!("odin_flightart_seq_{}", std::process::id()));
    let _ = fs::remove_dir_all( &dir);
    let archive = Archive::new( &dir, "epd");
    let img = white_image( 4, 4);

    let p1 = archive.save( &img, t0()).unwrap();
    let p2 = archive.save( &img, t0()).unwrap();
    let p3 = archive.save( &img, t0()).unwrap();

    assert_eq!( p1.file_name().unwrap().to_string_lossy(), archive_filename( t0().with_timezone(&Local), "epd"));
    assert!( p2.to_string_lossy().ends_with("_epd_1.png"));
    assert!( p3.to_string_lossy().ends_with("_epd_2.png"));
    assert!( p1.is_file() && p2.is_file() && p3.is_file());

    let _ = fs::remove_dir_all( &dir);
}
