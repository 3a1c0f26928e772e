// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::io;
use std::str::from_utf8;

use super::model::{Feature, OsmNode, Way};

/// Streams [Features](Feature) from an [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
/// file read through an [io::BufRead].
pub fn features_from_file<R: io::BufRead>(
    reader: R,
) -> impl Iterator<Item = Result<Feature, quick_xml::Error>> {
    Reader::from_io(reader)
}

/// Streams [Features](Feature) from an in-memory OSM XML buffer.
pub fn features_from_buffer(
    b: &[u8],
) -> impl Iterator<Item = Result<Feature, quick_xml::Error>> + '_ {
    Reader::from_buffer(b)
}

/// Parser is a trait for objects which can parse XML.
///
/// This trait only exists to fix the mismatch of
/// [quick_xml::Reader::read_event] when working on buffered data
/// and [quick_xml::Reader::read_event_into] when working on IO.
trait Parser {
    fn read_event<'a>(&'a mut self) -> quick_xml::Result<quick_xml::events::Event<'a>>;
}

/// IoParser implements [Parser] over an [std::io::BufRead].
struct IoParser<R: io::BufRead>(quick_xml::Reader<R>, Vec<u8>);

impl<R: io::BufRead> IoParser<R> {
    #[inline]
    fn new(reader: R) -> Self {
        Self(quick_xml::Reader::from_reader(reader), Vec::default())
    }
}

impl<R: io::BufRead> Parser for IoParser<R> {
    #[inline]
    fn read_event<'a>(&'a mut self) -> quick_xml::Result<quick_xml::events::Event<'a>> {
        self.0.read_event_into(&mut self.1)
    }
}

/// BufParser implements [Parser] over a slice of bytes (`&[u8]`).
struct BufParser<'a>(quick_xml::Reader<&'a [u8]>);

impl<'a> BufParser<'a> {
    #[inline]
    fn new(data: &'a [u8]) -> Self {
        Self(quick_xml::Reader::from_reader(data))
    }
}

impl<'a> Parser for BufParser<'a> {
    #[inline]
    fn read_event<'b>(&'b mut self) -> quick_xml::Result<quick_xml::events::Event<'b>> {
        self.0.read_event()
    }
}

/// Reader reads OSM [Features](Feature) from an XML document,
/// SAX-style: one feature per iteration, nothing buffered beyond
/// the feature under construction.
struct Reader<P: Parser> {
    parser: P,
    eof: bool,
}

impl<P: Parser> Reader<P> {
    #[inline]
    fn new(parser: P) -> Self {
        Self { parser, eof: false }
    }
}

impl<'a> Reader<BufParser<'a>> {
    #[inline]
    fn from_buffer(data: &'a [u8]) -> Self {
        Self::new(BufParser::new(data))
    }
}

impl<R: io::BufRead> Reader<IoParser<R>> {
    #[inline]
    fn from_io(reader: R) -> Self {
        Self::new(IoParser::new(reader))
    }
}

impl<P: Parser> Iterator for Reader<P> {
    type Item = Result<Feature, quick_xml::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut f: Option<Feature> = None;

        while !self.eof {
            let event = match self.parser.read_event() {
                Ok(e) => e,
                Err(e) => return Some(Err(e)),
            };

            match event {
                quick_xml::events::Event::Empty(start) => match start.local_name().as_ref() {
                    b"node" => {
                        if let Some(n) = parse_node(start) {
                            return Some(Ok(Feature::Node(n)));
                        }
                    }
                    // "way" can't be self-closing
                    b"tag" => {
                        if let Some(tags) = feature_tags(&mut f) {
                            if let Some((k, v)) = parse_tag(start) {
                                tags.insert(k, v);
                            }
                        }
                    }
                    b"nd" => {
                        if let Some(nodes) = feature_nodes(&mut f) {
                            if let Some(ref_) = parse_nd(start) {
                                nodes.push(ref_);
                            }
                        }
                    }
                    _ => {}
                },

                quick_xml::events::Event::Start(start) => match start.local_name().as_ref() {
                    b"node" => f = parse_node(start).map(Feature::Node),
                    b"way" => f = parse_way(start).map(Feature::Way),
                    // "relation" and everything below it is skipped
                    _ => {}
                },

                quick_xml::events::Event::End(end) => match end.local_name().as_ref() {
                    b"node" | b"way" => {
                        if let Some(f) = f.take() {
                            return Some(Ok(f));
                        }
                    }
                    _ => {}
                },

                quick_xml::events::Event::Eof => {
                    self.eof = true;
                }

                _ => {}
            }
        }

        f.map(Ok)
    }
}

fn parse_node(start: quick_xml::events::BytesStart<'_>) -> Option<OsmNode> {
    let mut id: Option<i64> = None;
    let mut lat = f64::NAN;
    let mut lon = f64::NAN;

    for attr in start.attributes() {
        let attr = attr.ok()?;
        match attr.key.as_ref() {
            b"id" => id = from_utf8(&attr.value).ok()?.parse().ok(),
            b"lat" => lat = from_utf8(&attr.value).ok()?.parse().ok()?,
            b"lon" => lon = from_utf8(&attr.value).ok()?.parse().ok()?,
            _ => {}
        }
    }

    match id {
        Some(id) if lat.is_finite() && lon.is_finite() => Some(OsmNode { id, lat, lon }),
        _ => {
            log::warn!(target: "osmroute.osm", "skipping malformed <node> element");
            None
        }
    }
}

fn parse_way(start: quick_xml::events::BytesStart<'_>) -> Option<Way> {
    let mut id: Option<i64> = None;

    for attr in start.attributes() {
        let attr = attr.ok()?;
        if attr.key.as_ref() == b"id" {
            id = from_utf8(&attr.value).ok()?.parse().ok();
        }
    }

    match id {
        Some(id) => Some(Way {
            id,
            nodes: Vec::default(),
            tags: HashMap::default(),
        }),
        None => {
            log::warn!(target: "osmroute.osm", "skipping <way> element without an id");
            None
        }
    }
}

fn parse_tag(start: quick_xml::events::BytesStart<'_>) -> Option<(String, String)> {
    let mut k = None;
    let mut v = None;

    for attr in start.attributes() {
        let attr = attr.ok()?;
        match attr.key.as_ref() {
            b"k" => k = from_utf8(&attr.value).ok().map(str::to_string),
            b"v" => v = from_utf8(&attr.value).ok().map(str::to_string),
            _ => {}
        }
    }

    k.map(|k| (k, v.unwrap_or_default()))
}

fn parse_nd(start: quick_xml::events::BytesStart<'_>) -> Option<i64> {
    for attr in start.attributes() {
        let attr = attr.ok()?;
        if attr.key.as_ref() == b"ref" {
            return from_utf8(&attr.value).ok()?.parse().ok();
        }
    }
    None
}

fn feature_tags(f: &mut Option<Feature>) -> Option<&mut HashMap<String, String>> {
    match f {
        Some(Feature::Way(ref mut w)) => Some(&mut w.tags),
        _ => None,
    }
}

fn feature_nodes(f: &mut Option<Feature>) -> Option<&mut Vec<i64>> {
    match f {
        Some(Feature::Way(ref mut w)) => Some(&mut w.nodes),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE_XML: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6">
  <node id="1" lat="46.24" lon="-63.13"/>
  <node id="2" lat="46.25" lon="-63.12"/>
  <node id="3" lat="46.26" lon="-63.11">
    <tag k="amenity" v="cafe"/>
  </node>
  <way id="100">
    <nd ref="1"/>
    <nd ref="2"/>
    <nd ref="3"/>
    <tag k="highway" v="residential"/>
    <tag k="name" v="Main Street"/>
  </way>
  <relation id="200">
    <member type="way" ref="100" role="from"/>
    <tag k="type" v="restriction"/>
  </relation>
  <way id="101">
    <nd ref="3"/>
    <nd ref="1"/>
    <tag k="highway" v="service"/>
    <tag k="oneway" v="yes"/>
  </way>
</osm>
"#;

    fn collect(data: &[u8]) -> (Vec<OsmNode>, Vec<Way>) {
        let mut nodes = Vec::new();
        let mut ways = Vec::new();
        for f in features_from_buffer(data) {
            match f.unwrap() {
                Feature::Node(n) => nodes.push(n),
                Feature::Way(w) => ways.push(w),
            }
        }
        (nodes, ways)
    }

    #[test]
    fn parses_nodes_and_ways() {
        let (nodes, ways) = collect(SIMPLE_XML);

        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0], OsmNode { id: 1, lat: 46.24, lon: -63.13 });
        assert_eq!(nodes[2].id, 3);

        assert_eq!(ways.len(), 2);
        assert_eq!(ways[0].id, 100);
        assert_eq!(ways[0].nodes, vec![1, 2, 3]);
        assert_eq!(ways[0].tag("highway"), Some("residential"));
        assert_eq!(ways[0].tag("name"), Some("Main Street"));

        assert_eq!(ways[1].nodes, vec![3, 1]);
        assert_eq!(ways[1].tag("oneway"), Some("yes"));
    }

    #[test]
    fn relations_are_skipped() {
        let (nodes, ways) = collect(SIMPLE_XML);
        // The restriction relation contributes neither nodes nor ways,
        // and its members don't leak into neighboring features.
        assert_eq!(nodes.len() + ways.len(), 5);
        assert!(ways.iter().all(|w| w.tag("type").is_none()));
    }

    #[test]
    fn io_reader_matches_buffer_reader() {
        let (buf_nodes, buf_ways) = collect(SIMPLE_XML);

        let mut io_nodes = Vec::new();
        let mut io_ways = Vec::new();
        for f in features_from_file(io::Cursor::new(SIMPLE_XML)) {
            match f.unwrap() {
                Feature::Node(n) => io_nodes.push(n),
                Feature::Way(w) => io_ways.push(w),
            }
        }

        assert_eq!(buf_nodes, io_nodes);
        assert_eq!(buf_ways, io_ways);
    }

    #[test]
    fn malformed_nodes_are_skipped() {
        let xml = br#"<osm>
          <node id="1" lat="bogus" lon="0.0"/>
          <node id="2" lat="1.0" lon="2.0"/>
        </osm>"#;
        let (nodes, _) = collect(xml);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].id, 2);
    }
}
