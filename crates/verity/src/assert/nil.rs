// ABOUTME: Absence check backing is_nil / not_nil
// ABOUTME: Implemented for Option, raw pointers, and the references and boxes that wrap them

/// Values that have an "absent" state.
pub trait Nilable {
    fn is_nil(&self) -> bool;
}

impl<T> Nilable for Option<T> {
    fn is_nil(&self) -> bool {
        self.is_none()
    }
}

impl<T: ?Sized> Nilable for *const T {
    fn is_nil(&self) -> bool {
        self.is_null()
    }
}

impl<T: ?Sized> Nilable for *mut T {
    fn is_nil(&self) -> bool {
        self.is_null()
    }
}

impl<N: Nilable + ?Sized> Nilable for &N {
    fn is_nil(&self) -> bool {
        (**self).is_nil()
    }
}

impl<N: Nilable + ?Sized> Nilable for &mut N {
    fn is_nil(&self) -> bool {
        (**self).is_nil()
    }
}

impl<N: Nilable + ?Sized> Nilable for Box<N> {
    fn is_nil(&self) -> bool {
        (**self).is_nil()
    }
}
