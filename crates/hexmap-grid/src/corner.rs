/// One of the six corners of a flat-top hex tile, numbered clockwise from
/// the upper-left.
///
/// All corner arithmetic is integer modular: rotation and crossing offsets
/// go through [`offset`](Corner::offset), never through angle comparisons.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Corner {
    UpperLeft,
    UpperRight,
    Right,
    LowerRight,
    LowerLeft,
    Left,
}

impl Corner {
    /// All corners in clockwise order, starting at the upper-left.
    pub const ALL: [Corner; 6] = [
        Corner::UpperLeft,
        Corner::UpperRight,
        Corner::Right,
        Corner::LowerRight,
        Corner::LowerLeft,
        Corner::Left,
    ];

    /// Clockwise index in `0..6`.
    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Corner for an index; wraps modulo 6.
    #[inline]
    pub const fn from_index(i: u8) -> Self {
        Self::ALL[(i % 6) as usize]
    }

    /// The next corner clockwise (`+1 mod 6`).
    #[inline]
    pub const fn clockwise(self) -> Self {
        self.offset(1)
    }

    /// The corner `n` clockwise steps away (`+n mod 6`).
    ///
    /// `offset(4)` is the crossing rule of the boundary walk: entering a
    /// neighbor tile across corner `c` resumes at corner `c + 4` in the
    /// neighbor's frame.
    #[inline]
    pub const fn offset(self, n: u8) -> Self {
        Self::from_index(self.index() + n)
    }
}
