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

use image::{Rgba,RgbaImage};
use odin_flightart::{
    OdinFlightArtError, RED, WHITE,
    projection::{project,BoundingBox,CanvasRegion,ClipPolicy,GeoPos,Orientation,PixelPoint,Projector,MAX_PIXEL_COORD},
    render::draw_polyline
};

fn seattle ()->BoundingBox {
    BoundingBox::from_corners( GeoPos::new( 47.59829, -122.63317), GeoPos::new( 47.23635, -122.29156))
}

const MAP: Orientation = Orientation { invert_x: false, invert_y: true };
const ART: Orientation = Orientation { invert_x: true, invert_y: true };

#[test]
fn test_corners_map_to_region_corners () {
    let bbox = seattle();
    let region = CanvasRegion::new( 2, 2, 475, 705);

    let nw = GeoPos::new( bbox.lat_max, bbox.lon_min);
    let se = GeoPos::new( bbox.lat_min, bbox.lon_max);

    // north-up map
    assert_eq!( project( &nw, &bbox, &region, &MAP).unwrap(), PixelPoint::new( 2, 2));
    assert_eq!( project( &se, &bbox, &region, &MAP).unwrap(), PixelPoint::new( 477, 707));

    // art variant flips both axes
    assert_eq!( project( &nw, &bbox, &region, &ART).unwrap(), PixelPoint::new( 477, 2));
    assert_eq!( project( &se, &bbox, &region, &ART).unwrap(), PixelPoint::new( 2, 707));

    // no inversion
    let o = Orientation::default();
    assert_eq!( project( &nw, &bbox, &region, &o).unwrap(), PixelPoint::new( 2, 707));
    assert_eq!( project( &se, &bbox, &region, &o).unwrap(), PixelPoint::new( 477, 2));
}

#[test]
fn test_matrix_corners () {
    let bbox = BoundingBox::from_corners( GeoPos::new( 47.712903, -122.628291), GeoPos::new( 47.161006, -122.202890));
    let region = CanvasRegion::new( 0, 0, 31, 63);
    let projector = Projector::new( bbox, region, MAP, ClipPolicy::Drop).unwrap();

    assert_eq!( projector.project( &GeoPos::new( bbox.lat_max, bbox.lon_min)), PixelPoint::new( 0, 0));
    assert_eq!( projector.project( &GeoPos::new( bbox.lat_min, bbox.lon_max)), PixelPoint::new( 31, 63));
}

#[test]
fn test_rounds_to_nearest () {
    let bbox = BoundingBox::from_corners( GeoPos::new( 0.0, 0.0), GeoPos::new( 10.0, 10.0));
    let region = CanvasRegion::new( 0, 0, 100, 100);
    let o = Orientation::default();

    // 100 * 0.0996 = 9.96 -> 10 (truncation would give 9)
    assert_eq!( project( &GeoPos::new( 0.996, 0.996), &bbox, &region, &o).unwrap(), PixelPoint::new( 10, 10));
    assert_eq!( project( &GeoPos::new( 0.04, 0.04), &bbox, &region, &o).unwrap(), PixelPoint::new( 0, 0));
}

#[test]
fn test_degenerate_bbox () {
    let region = CanvasRegion::new( 0, 0, 100, 100);
    let p = GeoPos::new( 47.5, -122.5);

    let flat_lat = BoundingBox::from_corners( GeoPos::new( 47.5, -123.0), GeoPos::new( 47.5, -122.0));
    assert!( flat_lat.is_degenerate());
    assert!( matches!( project( &p, &flat_lat, &region, &MAP), Err(OdinFlightArtError::DegenerateProjection(_))));

    let flat_lon = BoundingBox::from_corners( GeoPos::new( 47.0, -122.5), GeoPos::new( 48.0, -122.5));
    assert!( matches!( Projector::new( flat_lon, region, MAP, ClipPolicy::Keep), Err(OdinFlightArtError::DegenerateProjection(_))));

    // nothing observed yet
    assert!( BoundingBox::empty().is_degenerate());
    assert!( Projector::new( BoundingBox::empty(), region, MAP, ClipPolicy::Keep).is_err());

    // a single observed position
    let mut bbox = BoundingBox::empty();
    bbox.expand( &p);
    assert!( !bbox.is_empty());
    assert!( bbox.is_degenerate());
}

#[test]
fn test_clip_policy () {
    let bbox = BoundingBox::from_corners( GeoPos::new( 47.0, -123.0), GeoPos::new( 48.0, -122.0));
    let region = CanvasRegion::new( 0, 0, 31, 63);
    let outside = GeoPos::new( 48.5, -122.5); // north of the box
    let inside = GeoPos::new( 47.5, -122.5);

    let drop = Projector::new( bbox, region, MAP, ClipPolicy::Drop).unwrap();
    assert!( drop.project_clipped( &outside).is_none());
    assert!( drop.project_clipped( &inside).is_some());

    let keep = Projector::new( bbox, region, MAP, ClipPolicy::Keep).unwrap();
    let pp = keep.project_clipped( &outside).unwrap();
    assert!( pp.y < 0);

    let track = [inside, outside, inside];
    assert_eq!( drop.project_track( track.iter()).len(), 2);
    assert_eq!( keep.project_track( track.iter()).len(), 3);
}

#[test]
fn test_bbox_from_corners_any_order () {
    let a = GeoPos::new( 47.2, -122.2);
    let b = GeoPos::new( 47.7, -122.6);
    assert_eq!( BoundingBox::from_corners( a, b), BoundingBox::from_corners( b, a));

    let bbox = BoundingBox::from_corners( a, b);
    assert_eq!( bbox.lat_min, 47.2);
    assert_eq!( bbox.lon_max, -122.2);
}

#[test]
fn test_tiny_bbox_far_positions () {
    let bbox = BoundingBox::from_corners( GeoPos::new( 47.0, -122.0), GeoPos::new( 47.0000001, -121.9999999));
    let region = CanvasRegion::new( 2, 2, 475, 705);

    let projector = Projector::new( bbox, region, MAP, ClipPolicy::Keep).unwrap();
    let far = projector.project( &GeoPos::new( 10.0, 100.0));
    assert_eq!( far, PixelPoint::new( MAX_PIXEL_COORD, MAX_PIXEL_COORD));

    let far = projector.project( &GeoPos::new( 80.0, -170.0));
    assert_eq!( far, PixelPoint::new( 2 - MAX_PIXEL_COORD, 707 - MAX_PIXEL_COORD));

    // positions inside the box still land in the region
    let p = projector.project( &GeoPos::new( 47.00000005, -121.99999995));
    assert!( region.contains( &p));

    // clamped points can still be drawn
    let mut img = RgbaImage::from_pixel( 50, 50, Rgba(WHITE));
    let pts = projector.project_track( [ GeoPos::new( 10.0, 100.0), GeoPos::new( 80.0, -170.0) ].iter());
    draw_polyline( &mut img, &pts, Rgba(RED), 4);

    let projector = Projector::new( bbox, region, MAP, ClipPolicy::Drop).unwrap();
    assert!( projector.project_clipped( &GeoPos::new( 10.0, 100.0)).is_none());
}
