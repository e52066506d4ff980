use std::sync::Arc;

use urldecode::{FieldCache, FieldTable, Shaped};

fn names(table: &FieldTable) -> Vec<&'static str> {
    table.wire_names().collect()
}

#[derive(Shaped, Default, Debug)]
struct Paging {
    pub page: u32,
    pub per_page: u32,
    pub sort: String,
}

#[derive(Shaped, Default, Debug)]
struct Listing {
    #[url(flatten)]
    pub paging: Paging,
    pub sort: bool,
    pub q: String,
}

#[urldecode_testhelpers::test]
fn shallower_field_wins() {
    let table = FieldTable::build(Listing::SHAPE).unwrap();
    assert_eq!(names(&table), ["sort", "q", "page", "per_page"]);
    assert_eq!(table.get("sort").unwrap().depth(), 1);
    assert_eq!(table.get("page").unwrap().depth(), 2);

    let listing: Listing = urldecode::from_str("page=3&per_page=50&sort=1&q=x").unwrap();
    assert_eq!(listing.paging.page, 3);
    assert_eq!(listing.paging.per_page, 50);
    assert!(listing.sort);
    assert_eq!(listing.paging.sort, "");
}

#[derive(Shaped, Default, Debug)]
struct Left {
    pub x: u8,
    pub only_left: u8,
}

#[derive(Shaped, Default, Debug)]
struct Right {
    pub x: u8,
    #[url(rename = "y")]
    pub tagged_y: u8,
}

#[derive(Shaped, Default, Debug)]
struct Other {
    pub y: u8,
}

#[derive(Shaped, Default, Debug)]
struct Both {
    #[url(flatten)]
    pub left: Left,
    #[url(flatten)]
    pub right: Right,
    #[url(flatten)]
    pub other: Other,
}

#[urldecode_testhelpers::test]
fn equal_depth_ties_are_dropped() {
    let table = FieldTable::build(Both::SHAPE).unwrap();
    // `x` is ambiguous, `y` goes to the renamed field
    assert_eq!(names(&table), ["only_left", "y"]);
    assert!(table.get("y").unwrap().tagged);

    let both: Both = urldecode::from_str("x=1&only_left=2&y=3").unwrap();
    assert_eq!(both.left.x, 0);
    assert_eq!(both.right.x, 0);
    assert_eq!(both.left.only_left, 2);
    assert_eq!(both.right.tagged_y, 3);
    assert_eq!(both.other.y, 0);
}

#[derive(Shaped, Default, Debug)]
struct TwoTags {
    #[url(rename = "id")]
    pub a: u8,
    #[serde(rename = "id")]
    pub b: u8,
}

#[urldecode_testhelpers::test]
fn two_tagged_fields_cancel_out() {
    let table = FieldTable::build(TwoTags::SHAPE).unwrap();
    assert!(table.get("id").is_none());
}

#[derive(Shaped, Default, Debug)]
struct DeepTag {
    #[url(rename = "x")]
    pub tagged_x: u8,
}

#[derive(Shaped, Default, Debug)]
struct ShallowPlain {
    pub x: u8,
    #[url(flatten)]
    pub deep: DeepTag,
}

#[urldecode_testhelpers::test]
fn shallower_plain_field_beats_deeper_tagged_one() {
    let table = FieldTable::build(ShallowPlain::SHAPE).unwrap();
    assert_eq!(names(&table), ["x"]);
    let entry = table.get("x").unwrap();
    assert_eq!(entry.depth(), 1);
    assert!(!entry.tagged);

    let value: ShallowPlain = urldecode::from_str("x=5").unwrap();
    assert_eq!(value.x, 5);
    assert_eq!(value.deep.tagged_x, 0);
}

#[derive(Shaped, Default, Debug)]
struct LateTag {
    pub x: u8,
    #[serde(rename = "x")]
    pub other: u8,
}

#[urldecode_testhelpers::test]
fn tagged_field_wins_even_when_declared_last() {
    let table = FieldTable::build(LateTag::SHAPE).unwrap();
    assert_eq!(names(&table), ["x"]);
    let entry = table.get("x").unwrap();
    assert!(entry.tagged);
    assert_eq!(entry.field().name, "other");

    let value: LateTag = urldecode::from_str("x=4").unwrap();
    assert_eq!(value.other, 4);
    assert_eq!(value.x, 0);
}

#[derive(Shaped, Default, Debug)]
struct Named {
    #[url(rename = "paging")]
    #[url(flatten)]
    pub paging: Paging,
}

#[urldecode_testhelpers::test]
fn renamed_flatten_field_is_not_promoted() {
    let table = FieldTable::build(Named::SHAPE).unwrap();
    assert_eq!(names(&table), ["paging"]);
}

#[derive(Shaped, Default, Debug)]
struct Node {
    pub value: u32,
    #[url(flatten)]
    pub next: Option<Box<Node>>,
}

#[urldecode_testhelpers::test]
fn self_referential_flatten_terminates() {
    let table = FieldTable::build(Node::SHAPE).unwrap();
    assert_eq!(names(&table), ["value"]);

    let node: Node = urldecode::from_str("value=9").unwrap();
    assert_eq!(node.value, 9);
    assert!(node.next.is_none());
}

#[derive(Shaped, Default, Debug)]
struct Inner {
    pub deep: u32,
}

#[derive(Shaped, Default, Debug)]
struct Middle {
    #[url(flatten)]
    pub inner: Option<Box<Inner>>,
}

#[derive(Shaped, Default, Debug)]
struct Outer {
    #[serde(flatten)]
    pub middle: Option<Middle>,
    pub shallow: u32,
}

#[urldecode_testhelpers::test]
fn indirections_are_allocated_on_the_way() {
    let outer: Outer = urldecode::from_str("shallow=1").unwrap();
    assert!(outer.middle.is_none());

    let outer: Outer = urldecode::from_str("deep=7").unwrap();
    let deep = outer.middle.as_ref().and_then(|m| m.inner.as_ref()).map(|i| i.deep);
    assert_eq!(deep, Some(7));

    let table = FieldTable::build(Outer::SHAPE).unwrap();
    assert_eq!(table.get("deep").unwrap().depth(), 3);
}

mod hidden {
    use urldecode::Shaped;

    #[derive(Shaped, Default, Debug)]
    pub struct Embedded {
        pub visible: u32,
    }

    #[derive(Shaped, Default, Debug)]
    pub struct WithPrivate {
        pub public: u32,
        secret: u32,
        #[url(flatten)]
        embedded: Embedded,
        pub(crate) crate_visible: u32,
        pub(super) parent_visible: u32,
    }

    impl WithPrivate {
        pub fn secret(&self) -> u32 {
            self.secret
        }

        pub fn embedded(&self) -> &Embedded {
            &self.embedded
        }
    }
}

#[urldecode_testhelpers::test]
fn private_fields_are_not_addressable() {
    let table = FieldTable::build(hidden::WithPrivate::SHAPE).unwrap();
    // any `pub`, restricted or not, makes a field addressable
    assert_eq!(
        names(&table),
        ["public", "crate_visible", "parent_visible", "visible"]
    );

    let value: hidden::WithPrivate = urldecode::from_str(
        "public=1&secret=2&visible=3&crate_visible=4&parent_visible=5",
    )
    .unwrap();
    assert_eq!(value.public, 1);
    assert_eq!(value.secret(), 0);
    assert_eq!(value.embedded().visible, 3);
    assert_eq!(value.crate_visible, 4);
    assert_eq!(value.parent_visible, 5);
}

#[derive(Shaped, Default, Debug)]
struct Shared {
    pub n: u8,
}

#[derive(Shaped, Default, Debug)]
struct Twice {
    #[url(flatten)]
    pub first: Shared,
    #[url(flatten)]
    pub second: Shared,
}

#[urldecode_testhelpers::test]
fn struct_reached_twice_at_one_depth_is_promoted_once() {
    let twice: Twice = urldecode::from_str("n=5").unwrap();
    assert_eq!(twice.first.n, 5);
    assert_eq!(twice.second.n, 0);
}

#[urldecode_testhelpers::test]
fn cache_hands_out_one_table_per_type() {
    let cache = FieldCache::new();
    let a = cache.table_for(Listing::SHAPE).unwrap();
    let b = cache.table_for(Listing::SHAPE).unwrap();
    let c = cache.table_for(Both::SHAPE).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert!(!Arc::ptr_eq(&a, &c));
    assert_eq!(cache.len(), 2);
}
