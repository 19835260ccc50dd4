use chrono::{DateTime, TimeZone, Utc};
use flowstone::{
    Error,
    error::{Context, Malformation, Section},
    pockettopo::{
        self, Colour, CrossSectionMarker, Direction, Document, Drawing, Element, Extend, Mapping,
        Point, Polyline, Reference, Shot, StationNumber, Trip,
        units::{FULL_TURN, ROLL_TURN, angle, from_ticks, meters},
    },
};
use proptest::prelude::*;

fn sample() -> Document {
    let mut doc = Document::template();
    doc.trips.push(Trip {
        date: Utc.with_ymd_and_hms(2019, 4, 20, 10, 30, 0).unwrap(),
        comment: "Zweite Tour mit einem sehr langen Kommentar, ".repeat(4),
        declination: angle(491, FULL_TURN),
    });
    doc.shots = vec![
        Shot {
            from: "1.0".into(),
            to: "1.1".into(),
            tape: 4.321,
            compass: angle(12000, FULL_TURN),
            clino: angle(-900, FULL_TURN),
            roll: angle(17, ROLL_TURN),
            trip: 1,
            extend: Extend::Left,
            comment: Some("Engstelle".into()),
        },
        Shot {
            from: "1.1".into(),
            to: String::new(),
            tape: 1.2,
            ..Default::default()
        },
        Shot {
            from: "0".into(),
            to: "1.0".into(),
            tape: 0.5,
            trip: -1,
            ..Default::default()
        },
    ];
    doc.references.push(Reference {
        station: "1.0".into(),
        east: meters(4_512_345_678),
        north: meters(-5_300_123_456),
        altitude: meters(1_234_567),
        comment: "GPS".into(),
    });
    doc.outline.elements = vec![
        Element::Polyline(Polyline {
            colour: Colour::Brown,
            points: vec![
                Point {
                    x: meters(-1500),
                    y: meters(2500),
                },
                Point {
                    x: meters(100),
                    y: meters(0),
                },
            ],
        }),
        Element::CrossSection(CrossSectionMarker {
            position: Point {
                x: meters(3000),
                y: meters(-250),
            },
            station: "1.1".into(),
            direction: Direction::Horizontal,
        }),
        Element::Polyline(Polyline {
            colour: Colour::Orange,
            points: Vec::new(),
        }),
    ];
    doc.sideview.elements.push(Element::CrossSection(CrossSectionMarker {
        position: Point::default(),
        station: "0".into(),
        direction: Direction::Azimuth(angle(32768, FULL_TURN)),
    }));
    doc
}

#[test]
fn round_trip_sample() {
    let doc = sample();
    let bytes = pockettopo::dump(&doc).unwrap();
    let decoded = pockettopo::load(&bytes).unwrap();

    assert_eq!(decoded, doc);
    assert_eq!(pockettopo::dump(&decoded).unwrap(), bytes);
    assert_eq!(decoded.summary().to_string(), "2 trip(s), 3 shots, 3 named stations");
}

#[test]
fn decode_reader_matches_slice() {
    let bytes = pockettopo::dump(&sample()).unwrap();
    let from_reader = pockettopo::load_reader(&mut bytes.as_slice()).unwrap();
    assert_eq!(from_reader, pockettopo::load(&bytes).unwrap());
}

#[test]
fn template_layout() {
    let bytes = pockettopo::dump(&Document::template()).unwrap();

    assert_eq!(&bytes[..4], b"Top\x03");
    // Header, one trip, three empty sections and three mappings with two
    // end tags.
    assert_eq!(bytes.len(), 4 + 4 + 11 + 4 + 4 + 12 + 13 + 13);

    // Trailing padding is accepted.
    let mut padded = bytes.clone();
    padded.extend_from_slice(&[0; 8]);
    assert_eq!(pockettopo::load(&padded).unwrap(), Document::template());
}

#[test]
fn rejects_wrong_magic() {
    for data in [&b"Pot\x03"[..], b"P", b"Tx"] {
        assert!(matches!(
            pockettopo::load(data),
            Err(Error::InvalidMagic { .. })
        ));
    }

    // A correct but cut off signature is a short file.
    assert!(matches!(
        pockettopo::load(b"To"),
        Err(Error::UnexpectedEof { .. })
    ));
}

#[test]
fn unknown_drawing_elements_are_fatal() {
    let mut bytes = pockettopo::dump(&Document::template()).unwrap();
    let outline_end = bytes.len() - 14;
    assert_eq!(bytes[outline_end], 0);
    bytes[outline_end] = 2;

    match pockettopo::load(&bytes) {
        Err(Error::MalformedRecord {
            offset,
            context,
            reason,
        }) => {
            assert_eq!(reason, Malformation::UnknownElement(2));
            assert_eq!(offset, outline_end);
            assert_eq!(
                context,
                Context::Element {
                    section: Section::Outline,
                    tag: 2
                }
            );
        }
        other => panic!("expected malformed element, got {other:?}"),
    }
}

#[test]
fn unknown_colours_are_malformed() {
    let mut doc = Document::template();
    doc.sideview.elements.push(Element::Polyline(Polyline {
        colour: Colour::Red,
        points: Vec::new(),
    }));
    let mut bytes = pockettopo::dump(&doc).unwrap();

    // The colour byte precedes the sideview end tag.
    let colour = bytes.len() - 2;
    assert_eq!(bytes[colour], Colour::Red.index());
    bytes[colour] = 8;

    assert!(matches!(
        pockettopo::load(&bytes),
        Err(Error::MalformedRecord {
            reason: Malformation::UnknownColour(8),
            ..
        })
    ));
}

#[test]
fn truncated_shots_name_their_index() {
    let bytes = pockettopo::dump(&sample()).unwrap();
    let doc = sample();

    // Cut inside the second shot, which follows the two trips and the first
    // shot with its comment.
    let trips: usize = 4 + 11 + (8 + 2 + 2 + doc.trips[1].comment.len());
    let cut = 4 + trips + 4 + (20 + 1 + 9) + 10;

    assert!(matches!(
        pockettopo::load(&bytes[..cut]),
        Err(Error::UnexpectedEof {
            context: Context::Section {
                section: Section::Shots,
                index: 1
            },
            ..
        })
    ));
}

#[test]
fn average_sample_shots() {
    let mut shots = sample().shots;
    // A backsight of the first shot, read a few units further clockwise.
    let backsight = Shot {
        compass: angle(12010, FULL_TURN) + 180.0,
        comment: None,
        ..shots[0].reversed()
    };
    shots.push(backsight);

    let averaged = pockettopo::average_shots(&shots, &Default::default());
    assert_eq!(averaged.len(), 3);
    assert_eq!(averaged[0].from, "1.0");
    assert_eq!(averaged[0].comment.as_deref(), Some("Engstelle"));
    assert!((averaged[0].compass - angle(12005, FULL_TURN)).abs() < 1e-6);
    assert!((averaged[0].clino - shots[0].clino).abs() < 1e-9);
}

fn arb_station() -> impl Strategy<Value = String> {
    (any::<u16>(), any::<u16>())
        .prop_map(|(major, minor)| StationNumber { major, minor }.to_string())
}

fn arb_point() -> impl Strategy<Value = Point> {
    (any::<i32>(), any::<i32>()).prop_map(|(x, y)| Point {
        x: meters(x.into()),
        y: meters(y.into()),
    })
}

fn arb_mapping() -> impl Strategy<Value = Mapping> {
    (arb_point(), any::<i32>()).prop_map(|(center, scale)| Mapping { center, scale })
}

fn arb_date() -> impl Strategy<Value = DateTime<Utc>> {
    (0u64..3_155_378_975_999_999_999).prop_map(|t| from_ticks(t).unwrap())
}

fn arb_trip() -> impl Strategy<Value = Trip> {
    (arb_date(), ".{0,200}", any::<u16>()).prop_map(|(date, comment, dec)| Trip {
        date,
        comment,
        declination: angle(dec.into(), FULL_TURN),
    })
}

fn arb_shot() -> impl Strategy<Value = Shot> {
    (
        (arb_station(), arb_station(), any::<u32>()),
        (any::<u16>(), any::<i16>(), any::<u8>()),
        (any::<i16>(), any::<bool>(), proptest::option::of(".{0,40}")),
    )
        .prop_map(
            |((from, to, tape), (compass, clino, roll), (trip, left, comment))| Shot {
                from,
                to,
                tape: meters(tape.into()),
                compass: angle(compass.into(), FULL_TURN),
                clino: angle(clino.into(), FULL_TURN),
                roll: angle(roll.into(), ROLL_TURN),
                trip,
                extend: if left { Extend::Left } else { Extend::Right },
                comment,
            },
        )
}

fn arb_reference() -> impl Strategy<Value = Reference> {
    let mm = -(1i64 << 50)..(1i64 << 50);
    (arb_station(), mm.clone(), mm, any::<i32>(), ".{0,20}").prop_map(
        |(station, east, north, altitude, comment)| Reference {
            station,
            east: meters(east),
            north: meters(north),
            altitude: meters(altitude.into()),
            comment,
        },
    )
}

fn arb_element() -> impl Strategy<Value = Element> {
    let polyline = (
        prop::sample::select(Colour::ALL.to_vec()),
        prop::collection::vec(arb_point(), 0..8),
    )
        .prop_map(|(colour, points)| Element::Polyline(Polyline { colour, points }));

    let direction = prop_oneof![
        Just(Direction::Horizontal),
        (0i32..=0xffff).prop_map(|raw| Direction::Azimuth(angle(raw.into(), FULL_TURN))),
    ];
    let marker = (arb_point(), arb_station(), direction).prop_map(|(position, station, direction)| {
        Element::CrossSection(CrossSectionMarker {
            position,
            station,
            direction,
        })
    });

    prop_oneof![polyline, marker]
}

fn arb_drawing() -> impl Strategy<Value = Drawing> {
    (arb_mapping(), prop::collection::vec(arb_element(), 0..6))
        .prop_map(|(transform, elements)| Drawing { transform, elements })
}

fn arb_document() -> impl Strategy<Value = Document> {
    (
        any::<u8>(),
        prop::collection::vec(arb_trip(), 0..3),
        prop::collection::vec(arb_shot(), 0..12),
        prop::collection::vec(arb_reference(), 0..3),
        arb_mapping(),
        arb_drawing(),
        arb_drawing(),
    )
        .prop_map(
            |(version, trips, shots, references, transform, outline, sideview)| Document {
                version,
                trips,
                shots,
                references,
                transform,
                outline,
                sideview,
            },
        )
}

proptest! {
    #[test]
    fn documents_round_trip(doc in arb_document()) {
        let bytes = pockettopo::dump(&doc).unwrap();
        let decoded = pockettopo::load(&bytes).unwrap();
        prop_assert_eq!(&decoded, &doc);
        prop_assert_eq!(pockettopo::dump(&decoded).unwrap(), bytes);
    }

    #[test]
    fn truncated_documents_fail(doc in arb_document(), cut in any::<prop::sample::Index>()) {
        let bytes = pockettopo::dump(&doc).unwrap();
        let cut = cut.index(bytes.len());
        let is_eof = matches!(pockettopo::load(&bytes[..cut]), Err(Error::UnexpectedEof { .. }));
        prop_assert!(is_eof);
    }
}
