//! Pooled storage of the triangulator.
//!
//! Vertices, edges, triangles and vertex-to-edge links live in slabs
//! indexed by small typed ids. The intrusive doubly-linked lists of the
//! algorithm are `prev`/`next` u32 fields inside the slab entries;
//! list roots are sentinel entries at fixed indices. Nothing is returned
//! to the allocator while meshing: objects migrate between the free and
//! used lists of their pool.

use crate::geometry::{Circumcircle, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct VertId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EdgeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TriId(pub u32);

/// Edge-pool sentinels: free root, used root, convex-front root.
pub(crate) const EDGE_FREE: EdgeId = EdgeId(0);
pub(crate) const EDGE_USED: EdgeId = EdgeId(1);
pub(crate) const EDGE_FRONT: EdgeId = EdgeId(2);
const EDGE_SENTINELS: usize = 3;

/// Triangle-pool sentinels: free root, used root.
pub(crate) const TRI_FREE: TriId = TriId(0);
pub(crate) const TRI_USED: TriId = TriId(1);
const TRI_SENTINELS: usize = 2;

const LINK_FREE: u32 = 0;

#[derive(Debug, Clone)]
pub(crate) struct Vertex {
    pub pos: Vec2,
    /// Contour index in the source outline.
    pub contour: usize,
    /// Subglyph reading order of that contour.
    pub subglyph: usize,
    pub is_hole: bool,
    /// Enclosing contour for holes.
    pub nested_to: Option<usize>,
    /// Triangulation object this vertex belongs to; -1 means ignored.
    pub object: i32,
    /// Root link of the incident-edge list.
    pub edges_root: u32,
    pub prev_in_contour: VertId,
    pub next_in_contour: VertId,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Edge {
    prev: u32,
    next: u32,
    pub v1: VertId,
    pub v2: VertId,
    /// Attached triangles; `tri[0]` is always set for an edge in use.
    pub tri: [Option<TriId>; 2],
    /// Cached circumcircles of the two triangles a flip would create.
    pub alt_cc: [Circumcircle; 2],
}

impl Default for VertId {
    fn default() -> Self {
        VertId(u32::MAX)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Triangle {
    prev: u32,
    next: u32,
    pub edges: [EdgeId; 3],
    /// Cached circumcircle; zero radius means not computed yet.
    pub cc: Circumcircle,
    /// Scratch label: -1 untouched, -2 on a constraint track, 0/1 the
    /// parity of the excess-removal flood fill.
    pub helper: i32,
}

#[derive(Debug, Clone, Default)]
struct Link {
    prev: u32,
    next: u32,
    edge: EdgeId,
}

impl Default for EdgeId {
    fn default() -> Self {
        EdgeId(u32::MAX)
    }
}

/// Intrusive-list plumbing shared by the three linked pools.
macro_rules! list_ops {
    ($pool:ident, $init:ident, $detach:ident, $insert_after:ident,
     $attach_head:ident, $attach_tail:ident, $is_empty:ident, $first:ident,
     $next_of:ident, $prev_of:ident) => {
        fn $init(&mut self, i: u32) {
            self.$pool[i as usize].prev = i;
            self.$pool[i as usize].next = i;
        }

        fn $detach(&mut self, i: u32) {
            let prev = self.$pool[i as usize].prev;
            let next = self.$pool[i as usize].next;
            self.$pool[prev as usize].next = next;
            self.$pool[next as usize].prev = prev;
        }

        fn $insert_after(&mut self, what: u32, after: u32) {
            let next = self.$pool[after as usize].next;
            self.$pool[what as usize].prev = after;
            self.$pool[what as usize].next = next;
            self.$pool[after as usize].next = what;
            self.$pool[next as usize].prev = what;
        }

        fn $attach_head(&mut self, root: u32, what: u32) {
            self.$insert_after(what, root);
        }

        #[allow(dead_code)]
        fn $attach_tail(&mut self, root: u32, what: u32) {
            let last = self.$pool[root as usize].prev;
            self.$insert_after(what, last);
        }

        fn $is_empty(&self, root: u32) -> bool {
            self.$pool[root as usize].next == root
        }

        fn $first(&self, root: u32) -> u32 {
            self.$pool[root as usize].next
        }

        fn $next_of(&self, i: u32) -> u32 {
            self.$pool[i as usize].next
        }

        #[allow(dead_code)]
        fn $prev_of(&self, i: u32) -> u32 {
            self.$pool[i as usize].prev
        }
    };
}

/// The arena: every cross-reference in the mesher is an id into one of
/// these slabs.
pub(crate) struct Arena {
    pub verts: Vec<Vertex>,
    edges: Vec<Edge>,
    tris: Vec<Triangle>,
    links: Vec<Link>,
    /// Number of contour vertices; the two sweep seeds sit right after.
    pub nv: usize,
}

impl Arena {
    list_ops!(
        edges,
        edge_list_init,
        edge_detach_raw,
        edge_insert_after_raw,
        edge_attach_head_raw,
        edge_attach_tail_raw,
        edge_list_empty_raw,
        edge_first_raw,
        edge_next_raw,
        edge_prev_raw
    );
    list_ops!(
        tris,
        tri_list_init,
        tri_detach_raw,
        tri_insert_after_raw,
        tri_attach_head_raw,
        tri_attach_tail_raw,
        tri_list_empty_raw,
        tri_first_raw,
        tri_next_raw,
        tri_prev_raw
    );
    list_ops!(
        links,
        link_list_init,
        link_detach_raw,
        link_insert_after_raw,
        link_attach_head_raw,
        link_attach_tail_raw,
        link_list_empty_raw,
        link_first_raw,
        link_next_raw,
        link_prev_raw
    );

    /// Builds the pools with the given upper bounds and threads every
    /// allocatable entry onto its free list.
    pub fn with_capacity(maxe: usize, maxt: usize) -> Self {
        let mut arena = Arena {
            verts: Vec::new(),
            edges: vec![Edge::default(); EDGE_SENTINELS + maxe],
            tris: vec![
                Triangle {
                    prev: 0,
                    next: 0,
                    edges: [EdgeId::default(); 3],
                    cc: Circumcircle::default(),
                    helper: -1,
                };
                TRI_SENTINELS + maxt
            ],
            links: vec![Link::default(); 1 + maxe * 2],
            nv: 0,
        };
        arena.edge_list_init(EDGE_FREE.0);
        arena.edge_list_init(EDGE_USED.0);
        arena.edge_list_init(EDGE_FRONT.0);
        for i in EDGE_SENTINELS..arena.edges.len() {
            let i = i as u32;
            arena.edge_list_init(i);
            arena.edge_attach_tail_raw(EDGE_FREE.0, i);
        }
        arena.tri_list_init(TRI_FREE.0);
        arena.tri_list_init(TRI_USED.0);
        for i in TRI_SENTINELS..arena.tris.len() {
            let i = i as u32;
            arena.tri_list_init(i);
            arena.tri_attach_tail_raw(TRI_FREE.0, i);
        }
        arena.link_list_init(LINK_FREE);
        for i in 1..arena.links.len() {
            let i = i as u32;
            arena.link_list_init(i);
            arena.link_attach_tail_raw(LINK_FREE, i);
        }
        arena
    }

    /// Adds a vertex with a fresh (empty) incident-edge list root.
    pub fn push_vertex(&mut self, mut vertex: Vertex) -> VertId {
        let root = self.links.len() as u32;
        self.links.push(Link::default());
        self.link_list_init(root);
        vertex.edges_root = root;
        let id = VertId(self.verts.len() as u32);
        self.verts.push(vertex);
        id
    }

    pub fn vert(&self, v: VertId) -> &Vertex {
        &self.verts[v.0 as usize]
    }

    pub fn vert_mut(&mut self, v: VertId) -> &mut Vertex {
        &mut self.verts[v.0 as usize]
    }

    pub fn pos(&self, v: VertId) -> Vec2 {
        self.verts[v.0 as usize].pos
    }

    pub fn edge(&self, e: EdgeId) -> &Edge {
        &self.edges[e.0 as usize]
    }

    pub fn edge_mut(&mut self, e: EdgeId) -> &mut Edge {
        &mut self.edges[e.0 as usize]
    }

    pub fn tri(&self, t: TriId) -> &Triangle {
        &self.tris[t.0 as usize]
    }

    pub fn tri_mut(&mut self, t: TriId) -> &mut Triangle {
        &mut self.tris[t.0 as usize]
    }

    // -- edge list navigation --------------------------------------------

    pub fn edge_next(&self, e: EdgeId) -> EdgeId {
        EdgeId(self.edge_next_raw(e.0))
    }

    pub fn edge_prev(&self, e: EdgeId) -> EdgeId {
        EdgeId(self.edge_prev_raw(e.0))
    }

    pub fn edge_detach(&mut self, e: EdgeId) {
        self.edge_detach_raw(e.0);
        self.edge_list_init(e.0);
    }

    pub fn edge_insert_after(&mut self, what: EdgeId, after: EdgeId) {
        self.edge_detach_raw(what.0);
        self.edge_insert_after_raw(what.0, after.0);
    }

    pub fn edge_to_used(&mut self, e: EdgeId) {
        self.edge_detach_raw(e.0);
        self.edge_attach_head_raw(EDGE_USED.0, e.0);
    }

    pub fn front_is_empty(&self) -> bool {
        self.edge_list_empty_raw(EDGE_FRONT.0)
    }

    pub fn front_first(&self) -> EdgeId {
        EdgeId(self.edge_first_raw(EDGE_FRONT.0))
    }

    pub fn reset_front(&mut self) {
        self.edge_list_init(EDGE_FRONT.0);
    }

    /// Used-list walk in list order.
    pub fn used_edges(&self) -> Vec<EdgeId> {
        let mut out = Vec::new();
        let mut e = self.edge_first_raw(EDGE_USED.0);
        while e != EDGE_USED.0 {
            out.push(EdgeId(e));
            e = self.edge_next_raw(e);
        }
        out
    }

    pub fn used_triangles(&self) -> Vec<TriId> {
        let mut out = Vec::new();
        let mut t = self.tri_first_raw(TRI_USED.0);
        while t != TRI_USED.0 {
            out.push(TriId(t));
            t = self.tri_next_raw(t);
        }
        out
    }

    // -- allocation ------------------------------------------------------

    fn create_link(&mut self, v: VertId, e: EdgeId) -> Option<()> {
        if self.link_list_empty_raw(LINK_FREE) {
            return None;
        }
        let link = self.link_first_raw(LINK_FREE);
        self.link_detach_raw(link);
        let root = self.verts[v.0 as usize].edges_root;
        self.link_attach_head_raw(root, link);
        self.links[link as usize].edge = e;
        Some(())
    }

    fn drop_link(&mut self, v: VertId, e: EdgeId) {
        let root = self.verts[v.0 as usize].edges_root;
        let mut link = self.link_first_raw(root);
        while link != root {
            if self.links[link as usize].edge == e {
                self.link_detach_raw(link);
                self.link_attach_head_raw(LINK_FREE, link);
                return;
            }
            link = self.link_next_raw(link);
        }
    }

    /// Edges incident to a vertex, in list order.
    pub fn incident_edges(&self, v: VertId) -> Vec<EdgeId> {
        let root = self.verts[v.0 as usize].edges_root;
        let mut out = Vec::new();
        let mut link = self.link_first_raw(root);
        while link != root {
            out.push(self.links[link as usize].edge);
            link = self.link_next_raw(link);
        }
        out
    }

    /// Allocates an edge onto the used list. `None` when the edge pool is
    /// dry or fewer than two links remain.
    pub fn create_edge(&mut self, v1: VertId, v2: VertId) -> Option<EdgeId> {
        if self.edge_list_empty_raw(EDGE_FREE.0) {
            return None;
        }
        let free_link = self.link_first_raw(LINK_FREE);
        if free_link == LINK_FREE || self.link_next_raw(free_link) == LINK_FREE {
            return None;
        }
        let e = EdgeId(self.edge_first_raw(EDGE_FREE.0));
        self.edge_detach_raw(e.0);
        self.edge_attach_head_raw(EDGE_USED.0, e.0);
        let node = &mut self.edges[e.0 as usize];
        node.v1 = v1;
        node.v2 = v2;
        node.tri = [None, None];
        node.alt_cc = [Circumcircle::default(); 2];
        self.create_link(v1, e)?;
        self.create_link(v2, e)?;
        Some(e)
    }

    /// Releases an unattached edge back to the free list.
    pub fn free_edge(&mut self, e: EdgeId) -> bool {
        if self.edges[e.0 as usize].tri[0].is_some() {
            return false;
        }
        let (v1, v2) = {
            let node = &self.edges[e.0 as usize];
            (node.v1, node.v2)
        };
        self.drop_link(v1, e);
        self.drop_link(v2, e);
        self.edge_detach_raw(e.0);
        self.edge_attach_head_raw(EDGE_FREE.0, e.0);
        true
    }

    /// Repoints an edge at new endpoints without moving it between lists,
    /// clearing triangle attachments and caches.
    pub fn reset_edge(&mut self, e: EdgeId, v1: VertId, v2: VertId) {
        let (old1, old2) = {
            let node = &self.edges[e.0 as usize];
            (node.v1, node.v2)
        };
        self.drop_link(old1, e);
        self.drop_link(old2, e);
        let node = &mut self.edges[e.0 as usize];
        node.v1 = v1;
        node.v2 = v2;
        node.tri = [None, None];
        node.alt_cc = [Circumcircle::default(); 2];
        self.create_link(v1, e);
        self.create_link(v2, e);
    }

    /// Allocates a triangle over three edges, each of which must have a
    /// second attachment slot free.
    pub fn create_triangle(&mut self, e1: EdgeId, e2: EdgeId, e3: EdgeId) -> Option<TriId> {
        for e in [e1, e2, e3] {
            if self.edges[e.0 as usize].tri[1].is_some() {
                return None;
            }
        }
        if self.tri_list_empty_raw(TRI_FREE.0) {
            return None;
        }
        let t = TriId(self.tri_first_raw(TRI_FREE.0));
        self.tri_detach_raw(t.0);
        self.tri_attach_head_raw(TRI_USED.0, t.0);
        for e in [e1, e2, e3] {
            let node = &mut self.edges[e.0 as usize];
            node.tri[1] = node.tri[0];
            node.tri[0] = Some(t);
        }
        let node = &mut self.tris[t.0 as usize];
        node.edges = [e1, e2, e3];
        node.cc = Circumcircle::default();
        node.helper = -1;
        Some(t)
    }

    /// Detaches a triangle from its edges and frees it; optionally frees
    /// edges left with no triangle at all.
    pub fn free_triangle(&mut self, t: TriId, and_bare_edges: bool) {
        let edges = self.tris[t.0 as usize].edges;
        for e in edges {
            let node = &mut self.edges[e.0 as usize];
            if node.tri[0] == Some(t) {
                node.tri[0] = node.tri[1];
            }
            node.tri[1] = None;
            node.alt_cc = [Circumcircle::default(); 2];
        }
        if and_bare_edges {
            for e in edges {
                if self.edges[e.0 as usize].tri[0].is_none() {
                    self.free_edge(e);
                }
            }
        }
        self.tri_detach_raw(t.0);
        self.tri_attach_head_raw(TRI_FREE.0, t.0);
    }

    // -- structural predicates -------------------------------------------

    pub fn edge_has_vert(&self, e: EdgeId, v: VertId) -> bool {
        let node = &self.edges[e.0 as usize];
        node.v1 == v || node.v2 == v
    }

    pub fn edge_second_vert(&self, e: EdgeId, v: VertId) -> VertId {
        let node = &self.edges[e.0 as usize];
        if node.v1 == v {
            node.v2
        } else {
            node.v1
        }
    }

    pub fn edges_connected(&self, e1: EdgeId, e2: EdgeId) -> bool {
        let node = &self.edges[e2.0 as usize];
        self.edge_has_vert(e1, node.v1) || self.edge_has_vert(e1, node.v2)
    }

    /// The endpoint two connected edges share.
    pub fn common_vert(&self, e1: EdgeId, e2: EdgeId) -> VertId {
        let node = &self.edges[e1.0 as usize];
        if self.edge_has_vert(e2, node.v1) {
            node.v1
        } else {
            node.v2
        }
    }

    /// The other two edges of a triangle, in canonical order.
    pub fn other_edges(&self, t: TriId, first: EdgeId) -> (EdgeId, EdgeId) {
        let edges = self.tris[t.0 as usize].edges;
        let second = if edges[0] == first { edges[1] } else { edges[0] };
        let third = if edges[2] == first { edges[1] } else { edges[2] };
        (second, third)
    }

    /// The triangle edge not touching `v`.
    pub fn opposite_edge(&self, t: TriId, v: VertId) -> EdgeId {
        let edges = self.tris[t.0 as usize].edges;
        if !self.edge_has_vert(edges[0], v) {
            edges[0]
        } else if self.edge_has_vert(edges[1], v) {
            edges[2]
        } else {
            edges[1]
        }
    }

    /// The triangle vertex not on `e`.
    pub fn opposite_vert(&self, t: TriId, e: EdgeId) -> VertId {
        let (second, third) = self.other_edges(t, e);
        self.common_vert(second, third)
    }

    /// An edge is a constraint when its endpoints are neighbors in a
    /// source contour.
    pub fn is_contour_edge(&self, e: EdgeId) -> bool {
        let node = &self.edges[e.0 as usize];
        self.verts[node.v1.0 as usize].prev_in_contour == node.v2
            || self.verts[node.v2.0 as usize].prev_in_contour == node.v1
    }

    /// The neighbor of `t` across edge `e`.
    pub fn neighbor(&self, t: TriId, e: EdgeId) -> Option<TriId> {
        let node = &self.edges[e.0 as usize];
        if node.tri[0] == Some(t) {
            node.tri[1]
        } else {
            node.tri[0]
        }
    }

    /// Existing edge between two vertices, found through the incident
    /// list of the first.
    pub fn find_edge(&self, v1: VertId, v2: VertId) -> Option<EdgeId> {
        let root = self.verts[v1.0 as usize].edges_root;
        let mut link = self.link_first_raw(root);
        while link != root {
            let e = self.links[link as usize].edge;
            if self.edge_has_vert(e, v1) && self.edge_has_vert(e, v2) {
                return Some(e);
            }
            link = self.link_next_raw(link);
        }
        None
    }
}
