use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::sync::Arc;

use sluice_strategy::Strategy;
use sluice_stream::{
    Direction, Element, Error, Input, NativeInput, NativeOutput, Options, Output, Result,
};
use tracing::{debug, trace};

use crate::capability::{HasInputStream, HasOutputStream};
use crate::provider::{Opener, Provider};
use crate::resource::{self, Resource};

/// Name under which a capability fallback can be requested explicitly.
pub const CAPABILITY: &str = "capability";

type ErasedRead = Arc<dyn Fn(&dyn Any) -> io::Result<NativeInput> + Send + Sync>;
type ErasedWrite = Arc<dyn Fn(&dyn Any) -> io::Result<NativeOutput> + Send + Sync>;
type ErasedCapabilityWrite = Arc<dyn Fn(&dyn Any, bool) -> io::Result<NativeOutput> + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct Key {
    resource:  TypeId,
    element:   TypeId,
    direction: Direction,
}

impl Key {
    fn new<R: Any, T: Element>(direction: Direction) -> Self {
        Self {
            resource: TypeId::of::<R>(),
            element: TypeId::of::<T>(),
            direction,
        }
    }

    fn of<T: Element>(resource: &dyn Resource, direction: Direction) -> Self {
        Self {
            resource: resource.as_any().type_id(),
            element: TypeId::of::<T>(),
            direction,
        }
    }
}

struct Entry<F> {
    name: &'static str,
    open: F,
}

/// Providers for one (resource, element, direction) key. Only the preferred
/// entry is used unless the caller names another.
struct Slot<F> {
    preferred:  Option<Entry<F>>,
    alternates: Vec<Entry<F>>,
}

impl<F> Default for Slot<F> {
    fn default() -> Self {
        Self {
            preferred:  None,
            alternates: Vec::new(),
        }
    }
}

impl<F> Slot<F> {
    fn entries(&self) -> impl Iterator<Item = &Entry<F>> {
        self.preferred.iter().chain(&self.alternates)
    }

    /// Whether adding `name` here would shadow an existing entry.
    fn blocks(&self, name: &str, preferred: bool) -> bool {
        self.entries().any(|entry| entry.name == name) || (preferred && self.preferred.is_some())
    }

    fn select(&self, via: Option<&str>) -> Option<&Entry<F>> {
        match via {
            None => self.preferred.as_ref(),
            Some(name) => self.entries().find(|entry| entry.name == name),
        }
    }
}

#[derive(Default)]
struct Capability {
    input:  Option<ErasedRead>,
    output: Option<ErasedCapabilityWrite>,
}

/// Resolves (resource type, element type, direction) to exactly one opener.
///
/// A specific provider registered for the key wins; otherwise a capability
/// registered for the resource type applies; otherwise the request fails
/// with [`Error::UnsupportedResourceType`]. The strategy passed to each
/// operation decides how failures reach the caller.
pub struct Registry {
    options:      Options,
    readers:      HashMap<Key, Slot<ErasedRead>>,
    writers:      HashMap<Key, Slot<ErasedWrite>>,
    capabilities: HashMap<TypeId, Capability>,
}

impl Default for Registry {
    fn default() -> Self { Self::new(Options::default()) }
}

impl Registry {
    /// An empty registry.
    pub fn new(options: Options) -> Self {
        Self {
            options,
            readers: HashMap::new(),
            writers: HashMap::new(),
            capabilities: HashMap::new(),
        }
    }

    /// A registry with the built-in providers for files, `file:` URLs, TCP,
    /// child processes and the standard streams.
    pub fn with_defaults(options: Options) -> Self {
        let mut registry = Self::new(options);
        resource::install(&mut registry);
        registry
    }

    pub fn options(&self) -> &Options { &self.options }

    pub fn input<T, S>(&self, resource: &dyn Resource, strategy: &S) -> Result<S::Output<Input<T>>>
    where
        T: Element,
        S: Strategy<Error>,
    {
        strategy.run(|| self.open_input::<T>(resource, None))
    }

    pub fn output<T, S>(&self, resource: &dyn Resource, strategy: &S) -> Result<S::Output<Output<T>>>
    where
        T: Element,
        S: Strategy<Error>,
    {
        strategy.run(|| self.open_output::<T>(resource, Direction::Write, None))
    }

    pub fn append_output<T, S>(
        &self,
        resource: &dyn Resource,
        strategy: &S,
    ) -> Result<S::Output<Output<T>>>
    where
        T: Element,
        S: Strategy<Error>,
    {
        strategy.run(|| self.open_output::<T>(resource, Direction::Append, None))
    }

    /// Like [`Registry::input`], through the provider registered as `provider`.
    pub fn input_via<T, S>(
        &self,
        resource: &dyn Resource,
        provider: &str,
        strategy: &S,
    ) -> Result<S::Output<Input<T>>>
    where
        T: Element,
        S: Strategy<Error>,
    {
        strategy.run(|| self.open_input::<T>(resource, Some(provider)))
    }

    pub fn output_via<T, S>(
        &self,
        resource: &dyn Resource,
        provider: &str,
        strategy: &S,
    ) -> Result<S::Output<Output<T>>>
    where
        T: Element,
        S: Strategy<Error>,
    {
        strategy.run(|| self.open_output::<T>(resource, Direction::Write, Some(provider)))
    }

    pub fn append_output_via<T, S>(
        &self,
        resource: &dyn Resource,
        provider: &str,
        strategy: &S,
    ) -> Result<S::Output<Output<T>>>
    where
        T: Element,
        S: Strategy<Error>,
    {
        strategy.run(|| self.open_output::<T>(resource, Direction::Append, Some(provider)))
    }

    /// Register the preferred provider for its (resource, `T`, direction) key.
    ///
    /// Fails with [`Error::DuplicateProvider`] if the key already has a
    /// preferred provider or one with the same name.
    pub fn register<T, R>(&mut self, provider: Provider<R>) -> Result<()>
    where
        T: Element,
        R: Resource,
    {
        self.insert::<T, R>(provider, true)
    }

    /// Register a provider that is only used when requested by name.
    pub fn register_alternate<T, R>(&mut self, provider: Provider<R>) -> Result<()>
    where
        T: Element,
        R: Resource,
    {
        self.insert::<T, R>(provider, false)
    }

    /// Register one provider as preferred for every built-in element type.
    ///
    /// Either all three keys are registered or none is.
    pub fn register_builtin_elements<R: Resource>(&mut self, provider: Provider<R>) -> Result<()> {
        self.check_free::<u8, R>(&provider, true)?;
        self.check_free::<char, R>(&provider, true)?;
        self.check_free::<String, R>(&provider, true)?;

        self.register::<u8, R>(provider.clone())?;
        self.register::<char, R>(provider.clone())?;
        self.register::<String, R>(provider)
    }

    pub fn register_input_capability<R>(&mut self) -> &mut Self
    where
        R: Resource + HasInputStream,
    {
        let open: ErasedRead = Arc::new(|any: &dyn Any| downcast::<R>(any)?.input_stream());
        self.capabilities.entry(TypeId::of::<R>()).or_default().input = Some(open);
        self
    }

    pub fn register_output_capability<R>(&mut self) -> &mut Self
    where
        R: Resource + HasOutputStream,
    {
        let open: ErasedCapabilityWrite =
            Arc::new(|any: &dyn Any, append: bool| downcast::<R>(any)?.output_stream(append));
        self.capabilities.entry(TypeId::of::<R>()).or_default().output = Some(open);
        self
    }

    /// Whether an unnamed request for this key would find an opener.
    pub fn provides<R, T>(&self, direction: Direction) -> bool
    where
        R: Resource,
        T: Element,
    {
        let key = Key::new::<R, T>(direction);
        let specific = if direction.is_output() {
            self.writers.get(&key).is_some_and(|slot| slot.preferred.is_some())
        } else {
            self.readers.get(&key).is_some_and(|slot| slot.preferred.is_some())
        };
        specific
            || self.capabilities.get(&TypeId::of::<R>()).is_some_and(|capability| {
                if direction.is_output() {
                    capability.output.is_some()
                } else {
                    capability.input.is_some()
                }
            })
    }

    /// Built-in registration; keys are known to be free.
    pub(crate) fn install_builtin<R: Resource>(&mut self, provider: Provider<R>) {
        self.install::<u8, R>(provider.clone());
        self.install::<char, R>(provider.clone());
        self.install::<String, R>(provider);
    }

    fn install<T: Element, R: Resource>(&mut self, provider: Provider<R>) {
        let key = Key::new::<R, T>(provider.direction());
        let name = provider.name();
        match provider.into_opener() {
            Opener::Read(open) => {
                let open: ErasedRead = Arc::new(move |any: &dyn Any| open(downcast::<R>(any)?));
                self.readers.entry(key).or_default().preferred = Some(Entry { name, open });
            }
            Opener::Write(open) => {
                let open: ErasedWrite = Arc::new(move |any: &dyn Any| open(downcast::<R>(any)?));
                self.writers.entry(key).or_default().preferred = Some(Entry { name, open });
            }
        }
    }

    /// Fails if the provider's name is reserved or already taken for its key,
    /// or if it would replace the preferred entry.
    fn check_free<T: Element, R: Resource>(&self, provider: &Provider<R>, preferred: bool) -> Result<()> {
        let direction = provider.direction();
        let key = Key::new::<R, T>(direction);
        let name = provider.name();
        let taken = if direction.is_output() {
            self.writers.get(&key).is_some_and(|slot| slot.blocks(name, preferred))
        } else {
            self.readers.get(&key).is_some_and(|slot| slot.blocks(name, preferred))
        };
        if name == CAPABILITY || taken {
            return Err(Error::DuplicateProvider {
                provider: name.to_string(),
                resource: std::any::type_name::<R>(),
                element: T::NAME,
                direction,
            });
        }
        Ok(())
    }

    fn insert<T: Element, R: Resource>(&mut self, provider: Provider<R>, preferred: bool) -> Result<()> {
        self.check_free::<T, R>(&provider, preferred)?;

        let direction = provider.direction();
        let key = Key::new::<R, T>(direction);
        let name = provider.name();
        match provider.into_opener() {
            Opener::Read(open) => {
                let open: ErasedRead = Arc::new(move |any: &dyn Any| open(downcast::<R>(any)?));
                place(self.readers.entry(key).or_default(), Entry { name, open }, preferred);
            }
            Opener::Write(open) => {
                let open: ErasedWrite = Arc::new(move |any: &dyn Any| open(downcast::<R>(any)?));
                place(self.writers.entry(key).or_default(), Entry { name, open }, preferred);
            }
        }
        debug!(
            provider = name,
            resource = std::any::type_name::<R>(),
            element = T::NAME,
            %direction,
            preferred,
            "registered provider"
        );
        Ok(())
    }

    fn open_input<T: Element>(&self, resource: &dyn Resource, via: Option<&str>) -> Result<Input<T>> {
        let key = Key::of::<T>(resource, Direction::Read);
        let label = resource::label(resource);

        let opened = match self.readers.get(&key).and_then(|slot| slot.select(via)) {
            Some(entry) => {
                debug!(resource = %label, provider = entry.name, element = T::NAME, "opening input");
                (entry.open)(resource.as_any())
            }
            None => {
                let open = self
                    .capabilities
                    .get(&key.resource)
                    .and_then(|capability| capability.input.as_ref())
                    .filter(|_| accepts_capability(via))
                    .ok_or_else(|| self.unresolved::<T>(resource, Direction::Read, via))?;
                trace!(resource = %label, element = T::NAME, "opening input through capability");
                open(resource.as_any())
            }
        };

        let native = opened.map_err(|source| Error::ResourceUnavailable {
            resource: label.clone(),
            source,
        })?;
        Ok(Input::new(native, label, &self.options))
    }

    fn open_output<T: Element>(
        &self,
        resource: &dyn Resource,
        direction: Direction,
        via: Option<&str>,
    ) -> Result<Output<T>> {
        let key = Key::of::<T>(resource, direction);
        let label = resource::label(resource);

        let opened = match self.writers.get(&key).and_then(|slot| slot.select(via)) {
            Some(entry) => {
                debug!(resource = %label, provider = entry.name, element = T::NAME, %direction, "opening output");
                (entry.open)(resource.as_any())
            }
            None => {
                let open = self
                    .capabilities
                    .get(&key.resource)
                    .and_then(|capability| capability.output.as_ref())
                    .filter(|_| accepts_capability(via))
                    .ok_or_else(|| self.unresolved::<T>(resource, direction, via))?;
                trace!(resource = %label, element = T::NAME, %direction, "opening output through capability");
                open(resource.as_any(), direction == Direction::Append)
            }
        };

        let native = opened.map_err(|source| Error::ResourceUnavailable {
            resource: label.clone(),
            source,
        })?;
        Ok(Output::new(native, label, &self.options))
    }

    fn unresolved<T: Element>(
        &self,
        resource: &dyn Resource,
        direction: Direction,
        via: Option<&str>,
    ) -> Error {
        match via {
            Some(name) => Error::UnknownProvider {
                provider: name.to_string(),
                resource: resource.type_name(),
                element: T::NAME,
                direction,
            },
            None => Error::UnsupportedResourceType {
                resource: resource.type_name(),
                element: T::NAME,
                direction,
            },
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("options", &self.options)
            .field("readers", &self.readers.len())
            .field("writers", &self.writers.len())
            .field("capabilities", &self.capabilities.len())
            .finish()
    }
}

fn place<F>(slot: &mut Slot<F>, entry: Entry<F>, preferred: bool) {
    if preferred {
        slot.preferred = Some(entry);
    } else {
        slot.alternates.push(entry);
    }
}

fn accepts_capability(via: Option<&str>) -> bool { via.is_none_or(|name| name == CAPABILITY) }

fn downcast<R: Any>(resource: &dyn Any) -> io::Result<&R> {
    resource
        .downcast_ref::<R>()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "resource type mismatch"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sluice_strategy::{Capture, Outcome, Throwing};
    use sluice_stream::{ErrorKind, State};
    use std::io::Cursor;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct Memo(&'static str);

    impl HasInputStream for Memo {
        fn input_stream(&self) -> io::Result<NativeInput> {
            Ok(NativeInput::new(Cursor::new(format!("structural {}\n", self.0).into_bytes())))
        }
    }

    impl HasOutputStream for Memo {
        fn output_stream(&self, _append: bool) -> io::Result<NativeOutput> {
            Ok(NativeOutput::new(io::sink()))
        }
    }

    #[derive(Debug)]
    struct Unknown;

    fn text(tag: &'static str) -> Provider<Memo> {
        Provider::reader(tag, move |memo: &Memo| {
            Ok(NativeInput::new(Cursor::new(format!("{tag} {}\n", memo.0).into_bytes())))
        })
    }

    fn first_line(mut input: Input<String>) -> String { input.read().unwrap().unwrap() }

    #[test]
    fn test_specific_provider_beats_capability() {
        let mut registry = Registry::default();
        registry.register_input_capability::<Memo>();
        registry.register::<String, _>(text("specific")).unwrap();

        let input: Input<String> = registry.input(&Memo("a"), &Throwing).unwrap();
        assert_eq!(first_line(input), "specific a");
    }

    #[test]
    fn test_capability_applies_without_specific_provider() {
        let mut registry = Registry::default();
        registry.register_input_capability::<Memo>();
        registry.register::<String, _>(text("specific")).unwrap();

        let mut bytes: Input<u8> = registry.input(&Memo("b"), &Throwing).unwrap();
        assert_eq!(bytes.read().unwrap(), Some(b's'));
    }

    #[test]
    fn test_capability_by_name() {
        let mut registry = Registry::default();
        registry.register_input_capability::<Memo>();
        registry.register::<String, _>(text("specific")).unwrap();

        let input: Input<String> = registry.input_via(&Memo("c"), CAPABILITY, &Throwing).unwrap();
        assert_eq!(first_line(input), "structural c");
    }

    #[test]
    fn test_unsupported_resource_type() {
        let registry = Registry::default();

        let err = registry.input::<String, _>(&Unknown, &Throwing).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedResourceType);

        let outcome = registry
            .input::<String, _>(&Unknown, &Capture::new(ErrorKind::UnsupportedResourceType))
            .unwrap();
        assert!(matches!(
            outcome,
            Outcome::Failure(Error::UnsupportedResourceType { direction: Direction::Read, .. })
        ));
    }

    #[test]
    fn test_uncaptured_category_propagates() {
        let registry = Registry::default();
        let result =
            registry.output::<u8, _>(&Unknown, &Capture::new(ErrorKind::ResourceUnavailable));
        assert_eq!(result.unwrap_err().kind(), ErrorKind::UnsupportedResourceType);
    }

    #[test]
    fn test_duplicate_preferred_rejected() {
        let mut registry = Registry::default();
        registry.register::<String, _>(text("first")).unwrap();

        let err = registry.register::<String, _>(text("second")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Registration);

        let input: Input<String> = registry.input(&Memo("d"), &Throwing).unwrap();
        assert_eq!(first_line(input), "first d");
    }

    #[test]
    fn test_alternate_used_only_by_name() {
        let mut registry = Registry::default();
        registry.register::<String, _>(text("primary")).unwrap();
        registry.register_alternate::<String, _>(text("mirror")).unwrap();

        let input: Input<String> = registry.input(&Memo("e"), &Throwing).unwrap();
        assert_eq!(first_line(input), "primary e");

        let input: Input<String> = registry.input_via(&Memo("e"), "mirror", &Throwing).unwrap();
        assert_eq!(first_line(input), "mirror e");
    }

    #[test]
    fn test_alternate_name_must_be_unique() {
        let mut registry = Registry::default();
        registry.register::<String, _>(text("primary")).unwrap();
        let err = registry.register_alternate::<String, _>(text("primary")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Registration);
    }

    #[test]
    fn test_alternate_alone_is_not_preferred() {
        let mut registry = Registry::default();
        registry.register_alternate::<String, _>(text("mirror")).unwrap();

        assert!(!registry.provides::<Memo, String>(Direction::Read));
        let err = registry.input::<String, _>(&Memo("f"), &Throwing).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedResourceType);
    }

    #[test]
    fn test_unknown_provider_name() {
        let mut registry = Registry::default();
        registry.register::<String, _>(text("primary")).unwrap();

        let err = registry.input_via::<String, _>(&Memo("g"), "nope", &Throwing).unwrap_err();
        assert!(matches!(err, Error::UnknownProvider { ref provider, .. } if provider == "nope"));
    }

    #[test]
    fn test_opener_invoked_once_per_request() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        let mut registry = Registry::default();
        registry
            .register::<u8, _>(Provider::reader("counted", |_: &Memo| {
                CALLS.fetch_add(1, Ordering::SeqCst);
                Err(io::Error::from(io::ErrorKind::NotFound))
            }))
            .unwrap();

        let outcome = registry
            .input::<u8, _>(&Memo("h"), &Capture::new(io::ErrorKind::NotFound))
            .unwrap();
        assert!(outcome.is_failure());
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_output_capability_receives_append_flag() {
        #[derive(Debug)]
        struct Flagged;

        static APPENDS: AtomicUsize = AtomicUsize::new(0);

        impl HasOutputStream for Flagged {
            fn output_stream(&self, append: bool) -> io::Result<NativeOutput> {
                if append {
                    APPENDS.fetch_add(1, Ordering::SeqCst);
                }
                Ok(NativeOutput::new(io::sink()))
            }
        }

        let mut registry = Registry::default();
        registry.register_output_capability::<Flagged>();

        let out: Output<char> = registry.output(&Flagged, &Throwing).unwrap();
        assert_eq!(out.state(), State::Open);
        assert_eq!(APPENDS.load(Ordering::SeqCst), 0);

        let _: Output<char> = registry.append_output(&Flagged, &Throwing).unwrap();
        assert_eq!(APPENDS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_provides() {
        let mut registry = Registry::default();
        registry.register::<String, _>(text("primary")).unwrap();
        registry.register_output_capability::<Memo>();

        assert!(registry.provides::<Memo, String>(Direction::Read));
        assert!(!registry.provides::<Memo, u8>(Direction::Read));
        assert!(registry.provides::<Memo, u8>(Direction::Append));
        assert!(!registry.provides::<Unknown, u8>(Direction::Write));
    }

    #[test]
    fn test_builtin_elements_registration() {
        let mut registry = Registry::default();
        registry.register_builtin_elements(text("all")).unwrap();

        assert!(registry.provides::<Memo, u8>(Direction::Read));
        assert!(registry.provides::<Memo, char>(Direction::Read));
        assert!(registry.provides::<Memo, String>(Direction::Read));
    }

    #[test]
    fn test_options_reach_handles() {
        let mut registry = Registry::new(Options::new().flush_each_write(true));
        registry.register_output_capability::<Memo>();
        assert!(registry.options().get_flush_each_write());

        let mut out: Output<u8> = registry.output(&Memo("i"), &Throwing).unwrap();
        out.write(&1).unwrap();
        out.close().unwrap();
    }

    #[test]
    fn test_builtin_elements_registration_is_all_or_nothing() {
        let mut registry = Registry::default();
        registry.register::<char, _>(text("chars")).unwrap();

        let err = registry.register_builtin_elements(text("all")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Registration);
        assert!(!registry.provides::<Memo, u8>(Direction::Read));
        assert!(!registry.provides::<Memo, String>(Direction::Read));

        let again = registry.register_builtin_elements(text("all")).unwrap_err();
        assert!(matches!(again, Error::DuplicateProvider { element: "char", .. }));
    }

    #[test]
    fn test_capability_name_reserved() {
        let mut registry = Registry::default();
        let err = registry.register_alternate::<String, _>(text(CAPABILITY)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Registration);

        let err = registry.register::<u8, _>(text(CAPABILITY)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Registration);
        assert!(!registry.provides::<Memo, u8>(Direction::Read));
    }

    #[test]
    fn test_alternate_writers_by_name() {
        let opened = Arc::new(Mutex::new(Vec::new()));
        let writer = |name: &'static str| {
            let opened = opened.clone();
            move |_: &Memo| {
                opened.lock().unwrap().push(name);
                Ok::<_, io::Error>(NativeOutput::new(io::sink()))
            }
        };

        let mut registry = Registry::default();
        registry.register::<String, _>(Provider::writer("primary", writer("primary"))).unwrap();
        registry
            .register_alternate::<String, _>(Provider::writer("mirror", writer("mirror")))
            .unwrap();
        registry.register::<String, _>(Provider::appender("journal", writer("journal"))).unwrap();
        registry
            .register_alternate::<String, _>(Provider::appender("archive", writer("archive")))
            .unwrap();

        let _: Output<String> = registry.output(&Memo("j"), &Throwing).unwrap();
        let _: Output<String> = registry.output_via(&Memo("j"), "mirror", &Throwing).unwrap();
        let _: Output<String> = registry.append_output(&Memo("j"), &Throwing).unwrap();
        let _: Output<String> =
            registry.append_output_via(&Memo("j"), "archive", &Throwing).unwrap();
        assert_eq!(*opened.lock().unwrap(), vec!["primary", "mirror", "journal", "archive"]);

        let err = registry
            .append_output_via::<String, _>(&Memo("j"), "mirror", &Throwing)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownProvider { direction: Direction::Append, .. }));
    }
}
