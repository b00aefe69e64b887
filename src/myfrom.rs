use std::borrow::Cow;

use kstring::KString;

// FUTURE: figure out how to inherit from `From` (and keep all the
// existing From definitions for KString). It doesn't work out of the
// box (various errors).
pub trait MyFrom<T> {
    fn myfrom(s: T) -> Self;
}

// Can't do KString::from_static: no way to have a separate trait impl
// for &'static.
impl MyFrom<&str> for KString {
    fn myfrom(s: &str) -> Self {
        KString::from_ref(s)
    }
}

impl MyFrom<&&str> for KString {
    fn myfrom(s: &&str) -> Self {
        KString::from_ref(*s)
    }
}

impl MyFrom<&String> for KString {
    fn myfrom(s: &String) -> Self {
        KString::from_ref(s)
    }
}

impl MyFrom<String> for KString {
    fn myfrom(s: String) -> Self {
        KString::from_string(s)
    }
}

impl MyFrom<&KString> for KString {
    fn myfrom(s: &KString) -> Self {
        s.clone()
    }
}

impl MyFrom<KString> for KString {
    fn myfrom(s: KString) -> Self {
        s
    }
}

impl<'t> MyFrom<Cow<'t, str>> for KString {
    fn myfrom(s: Cow<'t, str>) -> Self {
        KString::from_ref(s.as_ref())
    }
}
